use crate::channel::Channel;
use crate::config::Config;
use crate::grid::{ChannelsGrid, PrimaryState};
use crate::keybindings::KeybindingRegistry;
use crate::store::ChannelStore;
use crate::tasks::{DeleteCompletion, DeleteTrigger, TaskError};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

// ============================================================================
// Event Types
// ============================================================================

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// The store finished re-reading its catalog.
    ChannelsRefreshed { count: usize },
    RefreshFailed { error: String },
    /// A delete task removed a channel's on-device content.
    ChannelDeleted { channel_id: String, name: String },
    ChannelDeleteFailed { channel_id: String, error: TaskError },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "refresh", "delete_channel")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    // Collaborators
    pub store: ChannelStore,
    pub trigger: Arc<dyn DeleteTrigger>,

    /// Grid view model: display list, loading flag, delete workflow.
    pub grid: ChannelsGrid,
    pub keybindings: KeybindingRegistry,

    // UI State
    /// Index into the grid's display list.
    pub selected: usize,
    pub show_help: bool,
    /// Scroll offset in the help screen for long keybinding lists.
    pub help_scroll_offset: usize,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub status_timeout: Duration,
    /// Only render when state has changed.
    pub needs_redraw: bool,
    /// Current frame of the loading spinner.
    pub spinner_frame: usize,

    /// In-flight refresh task, aborted when the app goes away.
    pub refresh_handle: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(store: ChannelStore, trigger: Arc<dyn DeleteTrigger>, config: &Config) -> Self {
        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!(warning = %warning, "Ignoring keybinding override");
        }

        let grid = ChannelsGrid::with_channels(store.snapshot());

        Self {
            store,
            trigger,
            grid,
            keybindings,
            selected: 0,
            show_help: false,
            help_scroll_offset: 0,
            status_message: None,
            status_timeout: Duration::from_secs(config.status_timeout_secs),
            needs_redraw: true,
            spinner_frame: 0,
            refresh_handle: None,
        }
    }

    /// Push a collection published by the store into the grid.
    pub fn sync_channels(&mut self, channels: Arc<Vec<Channel>>) {
        self.grid.set_channels(channels);
        self.clamp_selection();
        self.needs_redraw = true;
    }

    /// Keep `selected` inside the display list after it changes.
    pub fn clamp_selection(&mut self) {
        let len = self.grid.display_list().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn selected_channel(&self) -> Option<&Channel> {
        self.grid.display_list().get(self.selected)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn nav_down(&mut self) {
        let len = self.grid.display_list().len();
        if len > 0 {
            self.selected = self.selected.saturating_add(1).min(len - 1);
        }
    }

    pub fn nav_top(&mut self) {
        self.selected = 0;
    }

    pub fn nav_bottom(&mut self) {
        self.selected = self.grid.display_list().len().saturating_sub(1);
    }

    // ------------------------------------------------------------------
    // Delete workflow
    // ------------------------------------------------------------------

    /// Open the confirmation for the selected row.
    ///
    /// Rows are only interactive while they are on screen, so this is a
    /// no-op while loading or when the list is empty.
    pub fn request_delete_selected(&mut self) {
        if self.grid.primary_state() != PrimaryState::Rows {
            return;
        }
        if let Some(channel_id) = self.selected_channel().map(|c| c.id.clone()) {
            self.grid.request_delete(channel_id);
        }
    }

    /// Confirm the staged deletion.
    ///
    /// Returns the task's completion signal; a trigger that fails to start
    /// is reported on the status bar.
    pub fn confirm_delete(&mut self) -> Option<DeleteCompletion> {
        let label = self
            .grid
            .confirm_surface()
            .map(|surface| surface.label().to_string());

        match self.grid.confirm_delete(self.trigger.as_ref()) {
            Ok(Some(completion)) => {
                if let Some(label) = label {
                    self.set_status(format!("Deleting {}...", label));
                }
                Some(completion)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::error!(error = %e, "Failed to start delete task");
                self.set_status(format!("Delete failed: {}", e));
                None
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        if self.grid.pending_deletion().is_some() {
            self.grid.cancel_delete();
            self.set_status("Cancelled");
        }
    }

    // ------------------------------------------------------------------
    // Status bar
    // ------------------------------------------------------------------

    /// Set status message (expires after `status_timeout`)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= self.status_timeout {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

/// Abort in-flight work and discard workflow state when the app goes away.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh_handle.take() {
            handle.abort();
            tracing::debug!("Aborted refresh task on App drop");
        }
        self.grid.unmount();
    }
}
