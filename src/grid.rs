//! Channels grid view model.
//!
//! Owns the workflow state for one mounted grid: the loading flag, the
//! derived display list and the delete confirmation. The hosting view pushes
//! collection and loading changes in through [`ChannelsGrid::set_channels`]
//! and [`ChannelsGrid::set_loading`], and forwards user interaction as
//! [`GridAction`]s. [`ChannelsGrid::view`] describes what to draw.
use crate::channel::{display_list, Channel};
use crate::tasks::{DeleteCompletion, DeleteTrigger, TaskError};
use crate::workflow::DeleteWorkflow;
use std::sync::Arc;

/// Named user actions emitted by rows and the confirmation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridAction {
    RequestDelete(String),
    ConfirmDelete,
    CancelDelete,
}

/// The mutually exclusive primary states, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryState {
    Loading,
    Empty,
    Rows,
}

/// Render input for one channel row.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRow<'a> {
    pub channel: &'a Channel,
    pub usage_ratio: f64,
    pub usage_label: String,
}

impl ChannelRow<'_> {
    /// Action fired by this row's delete control.
    pub fn delete_action(&self) -> GridAction {
        GridAction::RequestDelete(self.channel.id.clone())
    }
}

/// Render input for the confirmation surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmSurface<'a> {
    pub channel_id: &'a str,
    /// Staged channel's record, when the collection still contains it.
    pub channel: Option<&'a Channel>,
}

impl ConfirmSurface<'_> {
    /// Name if known, otherwise the bare id.
    pub fn label(&self) -> &str {
        self.channel.map_or(self.channel_id, |c| c.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryView<'a> {
    Loading,
    Empty,
    Rows(Vec<ChannelRow<'a>>),
}

/// Everything needed to draw the grid for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GridView<'a> {
    pub primary: PrimaryView<'a>,
    pub confirm: Option<ConfirmSurface<'a>>,
}

#[derive(Debug, Default)]
pub struct ChannelsGrid {
    /// Raw collection as last pushed by the store.
    channels: Arc<Vec<Channel>>,
    display: Vec<Channel>,
    loading: bool,
    workflow: DeleteWorkflow,
}

impl ChannelsGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(channels: impl Into<Arc<Vec<Channel>>>) -> Self {
        let mut grid = Self::new();
        grid.set_channels(channels);
        grid
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Replace the working collection and rebuild the display list.
    pub fn set_channels(&mut self, channels: impl Into<Arc<Vec<Channel>>>) {
        self.channels = channels.into();
        self.display = display_list(&self.channels);
        tracing::debug!(
            total = self.channels.len(),
            visible = self.display.len(),
            "Channel collection replaced"
        );
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn display_list(&self) -> &[Channel] {
        &self.display
    }

    pub fn pending_deletion(&self) -> Option<&str> {
        self.workflow.pending()
    }

    pub fn primary_state(&self) -> PrimaryState {
        if self.loading {
            PrimaryState::Loading
        } else if self.display.is_empty() {
            PrimaryState::Empty
        } else {
            PrimaryState::Rows
        }
    }

    pub fn rows(&self) -> Vec<ChannelRow<'_>> {
        self.display
            .iter()
            .map(|channel| ChannelRow {
                channel,
                usage_ratio: channel.usage_ratio(),
                usage_label: channel.usage_label(),
            })
            .collect()
    }

    pub fn confirm_surface(&self) -> Option<ConfirmSurface<'_>> {
        let channel_id = self.workflow.pending()?;
        let channel = self.channels.iter().find(|c| c.id == channel_id);
        Some(ConfirmSurface {
            channel_id,
            channel,
        })
    }

    pub fn view(&self) -> GridView<'_> {
        let primary = match self.primary_state() {
            PrimaryState::Loading => PrimaryView::Loading,
            PrimaryState::Empty => PrimaryView::Empty,
            PrimaryState::Rows => PrimaryView::Rows(self.rows()),
        };
        GridView {
            primary,
            confirm: self.confirm_surface(),
        }
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    pub fn request_delete(&mut self, channel_id: impl Into<String>) {
        self.workflow.request(channel_id);
    }

    pub fn cancel_delete(&mut self) {
        if let Some(channel_id) = self.workflow.cancel() {
            tracing::debug!(channel_id = %channel_id, "Delete cancelled");
        }
    }

    /// Hand the staged id to `trigger` and close the confirmation.
    pub fn confirm_delete(
        &mut self,
        trigger: &dyn DeleteTrigger,
    ) -> Result<Option<DeleteCompletion>, TaskError> {
        self.workflow.confirm(trigger)
    }

    /// Apply a row or confirmation-surface action.
    ///
    /// Only `ConfirmDelete` can produce a completion or an error.
    pub fn dispatch(
        &mut self,
        action: GridAction,
        trigger: &dyn DeleteTrigger,
    ) -> Result<Option<DeleteCompletion>, TaskError> {
        match action {
            GridAction::RequestDelete(channel_id) => {
                self.request_delete(channel_id);
                Ok(None)
            }
            GridAction::ConfirmDelete => self.confirm_delete(trigger),
            GridAction::CancelDelete => {
                self.cancel_delete();
                Ok(None)
            }
        }
    }

    /// Discard workflow state when the grid goes away.
    pub fn unmount(&mut self) {
        self.workflow.reset();
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockTrigger {
        calls: Mutex<Vec<String>>,
    }

    impl DeleteTrigger for MockTrigger {
        fn trigger_delete(&self, channel_id: &str) -> Result<DeleteCompletion, TaskError> {
            self.calls.lock().unwrap().push(channel_id.to_string());
            let (_tx, completion) = DeleteCompletion::channel(channel_id);
            Ok(completion)
        }
    }

    fn sample() -> Vec<Channel> {
        vec![
            Channel::new("visible_channel", "visible channel", 5, 10),
            Channel::new("hidden_channel", "hidden channel", 0, 10),
        ]
    }

    #[test]
    fn test_defaults() {
        let grid = ChannelsGrid::new();
        assert!(!grid.is_loading());
        assert!(grid.pending_deletion().is_none());
        assert_eq!(grid.primary_state(), PrimaryState::Empty);
    }

    #[test]
    fn test_loading_takes_precedence() {
        let mut grid = ChannelsGrid::with_channels(sample());
        grid.set_loading(true);
        assert_eq!(grid.primary_state(), PrimaryState::Loading);
        assert_eq!(grid.view().primary, PrimaryView::Loading);

        grid.set_loading(false);
        assert_eq!(grid.primary_state(), PrimaryState::Rows);
    }

    #[test]
    fn test_rows_follow_display_list() {
        let grid = ChannelsGrid::with_channels(sample());
        let rows = grid.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].channel.id, "visible_channel");
        assert_eq!(rows[0].usage_ratio, 0.5);
        assert_eq!(rows[0].usage_label, "5/10 resources");
        assert_eq!(
            rows[0].delete_action(),
            GridAction::RequestDelete("visible_channel".to_string())
        );
    }

    #[test]
    fn test_set_channels_rebuilds_display() {
        let mut grid = ChannelsGrid::with_channels(sample());
        grid.set_channels(vec![Channel::new("hidden_channel", "hidden channel", 0, 10)]);
        assert!(grid.display_list().is_empty());
        assert_eq!(grid.primary_state(), PrimaryState::Empty);
    }

    #[test]
    fn test_confirm_surface_overlays_every_primary_state() {
        let mut grid = ChannelsGrid::with_channels(sample());
        grid.request_delete("visible_channel");

        let surface = grid.confirm_surface().unwrap();
        assert_eq!(surface.label(), "visible channel");

        grid.set_loading(true);
        let view = grid.view();
        assert_eq!(view.primary, PrimaryView::Loading);
        assert!(view.confirm.is_some());
    }

    #[test]
    fn test_confirm_surface_for_vanished_channel_shows_id() {
        let mut grid = ChannelsGrid::with_channels(sample());
        grid.request_delete("visible_channel");
        grid.set_channels(Vec::new());

        let surface = grid.confirm_surface().unwrap();
        assert!(surface.channel.is_none());
        assert_eq!(surface.label(), "visible_channel");
    }

    #[test]
    fn test_dispatch_actions() {
        let mut grid = ChannelsGrid::with_channels(sample());
        let trigger = MockTrigger::default();

        let none = grid
            .dispatch(GridAction::RequestDelete("visible_channel".into()), &trigger)
            .unwrap();
        assert!(none.is_none());
        assert_eq!(grid.pending_deletion(), Some("visible_channel"));

        let completion = grid.dispatch(GridAction::ConfirmDelete, &trigger).unwrap();
        assert!(completion.is_some());
        assert!(grid.pending_deletion().is_none());
        assert_eq!(*trigger.calls.lock().unwrap(), vec!["visible_channel"]);

        grid.dispatch(GridAction::RequestDelete("visible_channel".into()), &trigger)
            .unwrap();
        grid.dispatch(GridAction::CancelDelete, &trigger).unwrap();
        assert!(grid.pending_deletion().is_none());
        assert_eq!(trigger.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unmount_discards_pending() {
        let mut grid = ChannelsGrid::with_channels(sample());
        grid.set_loading(true);
        grid.request_delete("visible_channel");

        grid.unmount();
        assert!(grid.pending_deletion().is_none());
        assert!(!grid.is_loading());
    }
}
