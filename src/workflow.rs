//! Delete confirmation state machine.
//!
//! `Idle` → `Confirming { channel_id }` on a row's delete action, back to
//! `Idle` on cancel or confirm. Confirming hands the staged id to a
//! [`DeleteTrigger`] exactly once and clears the stage whatever the trigger
//! does.
use crate::tasks::{DeleteCompletion, DeleteTrigger, TaskError};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeleteState {
    #[default]
    Idle,
    Confirming {
        channel_id: String,
    },
}

#[derive(Debug, Default)]
pub struct DeleteWorkflow {
    state: DeleteState,
}

impl DeleteWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DeleteState {
        &self.state
    }

    /// Id staged for deletion, if the confirmation surface is open.
    pub fn pending(&self) -> Option<&str> {
        match &self.state {
            DeleteState::Idle => None,
            DeleteState::Confirming { channel_id } => Some(channel_id),
        }
    }

    pub fn is_confirming(&self) -> bool {
        self.pending().is_some()
    }

    /// Stage `channel_id`, replacing any channel staged before it.
    pub fn request(&mut self, channel_id: impl Into<String>) {
        let channel_id = channel_id.into();
        if let Some(previous) = self.pending() {
            tracing::debug!(previous, channel_id = %channel_id, "Re-targeting delete confirmation");
        }
        self.state = DeleteState::Confirming { channel_id };
    }

    /// Close the confirmation without side effects.
    ///
    /// Returns the id that was staged, if any.
    pub fn cancel(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            DeleteState::Idle => None,
            DeleteState::Confirming { channel_id } => Some(channel_id),
        }
    }

    /// Dispatch the staged id to `trigger` and return to `Idle`.
    ///
    /// `Ok(None)` when nothing was staged. Trigger failures are returned to
    /// the caller unchanged; the stage is cleared before the trigger runs.
    pub fn confirm(
        &mut self,
        trigger: &dyn DeleteTrigger,
    ) -> Result<Option<DeleteCompletion>, TaskError> {
        let Some(channel_id) = self.cancel() else {
            return Ok(None);
        };
        tracing::info!(channel_id = %channel_id, "Dispatching channel delete");
        trigger.trigger_delete(&channel_id).map(Some)
    }

    /// Drop any staged deletion without dispatching it.
    pub fn reset(&mut self) {
        self.state = DeleteState::Idle;
    }
}
