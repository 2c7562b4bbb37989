//! Render functions for the TUI.
//!
//! Lays out the header, the channel grid and the status bar, then draws
//! any overlay on top.

use crate::app::App;
use crate::grid::ConfirmSurface;
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::util::{sanitize_label, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{channels, help, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 8;

/// Main render function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    channels::render(f, app, chunks[1]);
    status::render(f, app, chunks[2]);

    if let Some(surface) = app.grid.confirm_surface() {
        render_confirm_overlay(f, app, &surface);
    }

    if app.show_help {
        help::render(f, app);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let on_device = app.grid.display_list().len();
    let total = app.grid.channels().len();
    let line = Line::from(vec![
        Span::styled(" chanman ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("{} of {} channels on device", on_device, total)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// Render the delete confirmation dialog centered on screen.
fn render_confirm_overlay(f: &mut Frame, app: &App, surface: &ConfirmSurface<'_>) {
    let area = f.area();

    let confirm_keys = app
        .keybindings
        .keys_for(KbContext::Confirm, KbAction::ConfirmDelete);
    let mut cancel_keys: Vec<String> = Vec::new();
    for key in app
        .keybindings
        .keys_for(KbContext::Confirm, KbAction::CancelDelete)
    {
        // "n" and "N" read as one key in the prompt
        if !cancel_keys.iter().any(|k| k.eq_ignore_ascii_case(&key)) {
            cancel_keys.push(key);
        }
    }
    let prompt = format!(
        "({}) Delete  ({}) Cancel",
        confirm_keys.first().map(String::as_str).unwrap_or("y"),
        cancel_keys.join("/")
    );

    let width = 50u16.min(area.width.saturating_sub(4));
    let inner_width = width.saturating_sub(2) as usize;

    let mut lines = vec![
        format!("Delete \"{}\"?", sanitize_label(surface.label())),
        String::new(),
        format!("id: {}", sanitize_label(surface.channel_id)),
    ];
    if let Some(channel) = surface.channel {
        if channel.version > 0 {
            lines[2].push_str(&format!("  v{}", channel.version));
        }
        if !channel.description.is_empty() {
            let description = sanitize_label(&channel.description);
            lines.push(truncate_to_width(&description, inner_width).into_owned());
        }
        lines.push(channel.usage_label());
    }
    lines.push(String::new());
    lines.push(prompt);

    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(lines.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center);

    f.render_widget(paragraph, overlay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::config::Config;
    use crate::store::ChannelStore;
    use crate::tasks::CatalogDeleteTrigger;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn test_app(channels: Vec<Channel>) -> App {
        let store = ChannelStore::in_memory(channels);
        let trigger = Arc::new(CatalogDeleteTrigger::new(store.clone()));
        App::new(store, trigger, &Config::default())
    }

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty_state() {
        let app = test_app(vec![Channel::new("a", "Alpha", 0, 3)]);
        let screen = draw(&app, 80, 24);
        assert!(screen.contains(channels::EMPTY_TEXT));
        assert!(!screen.contains("Alpha"));
    }

    #[test]
    fn test_loading_hides_rows() {
        let mut app = test_app(vec![Channel::new("a", "Alpha", 1, 3)]);
        app.grid.set_loading(true);
        let screen = draw(&app, 80, 24);
        assert!(screen.contains(channels::LOADING_TEXT));
        assert!(!screen.contains("Alpha"));
        assert!(!screen.contains(channels::EMPTY_TEXT));
    }

    #[test]
    fn test_rows_sorted_by_name() {
        let app = test_app(vec![
            Channel::new("b", "beautiful channel", 1, 2),
            Channel::new("a", "awesome channel", 1, 2),
        ]);
        let screen = draw(&app, 80, 24);
        let awesome = screen.find("awesome channel").unwrap();
        let beautiful = screen.find("beautiful channel").unwrap();
        assert!(awesome < beautiful);
        assert!(screen.contains("1/2 resources"));
    }

    #[test]
    fn test_confirm_overlay() {
        let mut app = test_app(vec![Channel::new("a1", "Alpha", 1, 2)]);
        app.grid.request_delete("a1");
        let screen = draw(&app, 80, 24);
        assert!(screen.contains("Delete \"Alpha\"?"));
        assert!(screen.contains("id: a1"));
        assert!(screen.contains("(y) Delete  (n/Esc) Cancel"));
    }

    #[test]
    fn test_confirm_overlay_shows_version_and_description() {
        let mut channel = Channel::new("a1", "Alpha", 1, 2);
        channel.version = 7;
        channel.description = "Maths\x1b[31m and\nscience".to_string();
        let mut app = test_app(vec![channel]);
        app.grid.request_delete("a1");
        let screen = draw(&app, 80, 24);
        assert!(screen.contains("id: a1  v7"));
        assert!(screen.contains("Maths and science"));
        assert!(screen.contains("1/2 resources"));
    }

    #[test]
    fn test_confirm_overlay_for_vanished_channel() {
        let mut app = test_app(vec![Channel::new("a1", "Alpha", 1, 2)]);
        app.grid.request_delete("ghost");
        let screen = draw(&app, 80, 24);
        assert!(screen.contains("Delete \"ghost\"?"));
    }

    #[test]
    fn test_help_overlay() {
        let mut app = test_app(Vec::new());
        app.show_help = true;
        let screen = draw(&app, 80, 30);
        assert!(screen.contains("Channel List"));
        assert!(screen.contains("Delete selected channel"));
    }

    #[test]
    fn test_too_small_terminal() {
        let app = test_app(vec![Channel::new("a", "Alpha", 1, 1)]);
        let screen = draw(&app, 30, 6);
        assert!(screen.contains("Too small") || screen.contains("Terminal too small"));
        assert!(!screen.contains("Alpha"));
    }
}
