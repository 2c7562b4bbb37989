//! Application event handling.
//!
//! Processes completion events from refresh and delete tasks.

use crate::app::{App, AppEvent};

/// Handle application events from background tasks.
///
/// The store subscription already carries new collections into the grid;
/// these events settle the loading flag and report outcomes on the status bar.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::ChannelsRefreshed { count } => {
            app.grid.set_loading(false);
            app.refresh_handle = None;
            app.sync_channels(app.store.snapshot());
            tracing::info!(count, "Channel list refreshed");
            app.set_status(format!("Refreshed {} channels", count));
        }
        AppEvent::RefreshFailed { error } => {
            app.grid.set_loading(false);
            app.refresh_handle = None;
            app.set_status(format!("Refresh failed: {}", error));
        }
        AppEvent::ChannelDeleted { channel_id, name } => {
            tracing::info!(channel_id = %channel_id, name = %name, "Channel content deleted");
            app.sync_channels(app.store.snapshot());
            app.set_status(format!("Deleted \"{}\"", name));
        }
        AppEvent::ChannelDeleteFailed { channel_id, error } => {
            tracing::error!(channel_id = %channel_id, error = %error, "Failed to delete channel");
            app.set_status(format!("Delete failed: {}", error));
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            if task == "refresh" {
                app.grid.set_loading(false);
                app.refresh_handle = None;
            }
            app.set_status(format!("Internal error in {} task", task));
        }
    }
    app.needs_redraw = true;
}
