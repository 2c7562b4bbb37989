//! Main event loop for the TUI.
//!
//! Terminal setup and teardown plus the `select!` loop that feeds input,
//! task events and store updates into the app.

use crate::app::{App, AppEvent};
use anyhow::Result;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

use super::events::handle_app_event;
use super::input::handle_input;
use super::render::render;

/// What the loop should do after a key press.
pub enum Action {
    Continue,
    Quit,
}

/// Runs the TUI application event loop.
///
/// Waits on shutdown signals, key presses, task events, store publications
/// and a 250ms tick, redrawing only after something changed. The terminal
/// is restored on exit and from a panic hook.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    install_panic_hook();

    let mut terminal = setup_terminal()?;
    let mut keys = crossterm::event::EventStream::new();
    let mut ticks = tokio::time::interval(Duration::from_millis(250));
    let mut shutdown = ShutdownSignals::new()?;

    let mut channels_rx = app.store.subscribe();
    let mut store_open = true;

    loop {
        if app.clear_expired_status() {
            app.needs_redraw = true;
        }
        while let Ok(event) = event_rx.try_recv() {
            handle_app_event(app, event);
        }
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        tokio::select! {
            biased;

            name = shutdown.recv() => {
                tracing::info!(signal = name, "Shutting down on signal");
                break;
            }

            maybe_event = keys.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => {
                    app.needs_redraw = true;
                    if let Action::Quit = handle_input(app, key.code, key.modifiers, &event_tx) {
                        break;
                    }
                }
                Some(Ok(Event::Resize(..))) => app.needs_redraw = true,
                Some(Ok(_)) => {}
                Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                None => {
                    tracing::info!("Terminal event stream closed");
                    break;
                }
            },

            Some(event) = event_rx.recv() => handle_app_event(app, event),

            changed = channels_rx.changed(), if store_open => match changed {
                Ok(()) => {
                    let channels = Arc::clone(&*channels_rx.borrow_and_update());
                    app.sync_channels(channels);
                }
                Err(_) => store_open = false,
            },

            _ = ticks.tick() => handle_tick(app),
        }
    }

    app.grid.unmount();
    restore_terminal(terminal)?;
    Ok(())
}

/// SIGTERM and SIGINT as one stream. Never fires off unix.
struct ShutdownSignals {
    #[cfg(unix)]
    term: Signal,
    #[cfg(unix)]
    int: Signal,
}

impl ShutdownSignals {
    fn new() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            term: signal(SignalKind::terminate())?,
            #[cfg(unix)]
            int: signal(SignalKind::interrupt())?,
        })
    }

    #[cfg(unix)]
    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.term.recv() => "SIGTERM",
            _ = self.int.recv() => "SIGINT",
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> &'static str {
        std::future::pending().await
    }
}

/// Leave raw mode before the default hook prints the panic.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        previous(info);
    }));
}

/// Number of frames in the loading spinner animation.
pub(super) const SPINNER_FRAMES: usize = 10;

/// Animate the spinner while a refresh is in flight.
fn handle_tick(app: &mut App) {
    if app.grid.is_loading() {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES;
        app.needs_redraw = true;
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
