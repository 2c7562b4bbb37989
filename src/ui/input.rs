//! Input handling for the TUI.
//!
//! Keys are resolved through the keybinding registry in the context of
//! whatever currently owns input: the help overlay, the delete
//! confirmation, or the channel list.

use crate::app::{App, AppEvent};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{spawn_delete_watch, spawn_refresh};
use super::Action;

/// Main input dispatch function.
///
/// Overlays capture all keys while visible. Ctrl+C always quits, since raw
/// mode swallows the interrupt signal.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if app.show_help {
        return handle_help_input(app, code, modifiers);
    }

    if app.grid.pending_deletion().is_some() {
        return handle_confirm_input(app, code, modifiers, event_tx);
    }

    handle_list_input(app, code, modifiers, event_tx)
}

/// Handle input while the help overlay is visible.
fn handle_help_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Help)
    {
        Some(KbAction::CloseHelp) => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        Some(KbAction::NavDown) => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        Some(KbAction::NavUp) => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input while a deletion awaits confirmation.
///
/// Confirming hands the staged id to the delete trigger and watches the
/// task in the background; its outcome arrives as an `AppEvent`.
fn handle_confirm_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Confirm)
    {
        Some(KbAction::ConfirmDelete) => {
            if let Some(completion) = app.confirm_delete() {
                spawn_delete_watch(completion, event_tx);
            }
        }
        Some(KbAction::CancelDelete) => app.cancel_delete(),
        _ => {}
    }
    Action::Continue
}

/// Handle input on the channel list.
fn handle_list_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let action = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::ChannelList);

    match action {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::NavTop) => app.nav_top(),
        Some(KbAction::NavBottom) => app.nav_bottom(),
        Some(KbAction::Refresh) => spawn_refresh(app, event_tx),
        Some(KbAction::DeleteChannel) => app.request_delete_selected(),
        Some(KbAction::ShowHelp) => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        _ => {}
    }
    Action::Continue
}
