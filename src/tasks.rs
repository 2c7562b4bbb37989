//! Channel deletion task runner.
//!
//! The grid hands a channel id to a [`DeleteTrigger`] and moves on. The
//! trigger starts the deletion and returns a [`DeleteCompletion`] that
//! resolves once the task settles; callers may await it or drop it.
use crate::store::{ChannelStore, StoreError};
use thiserror::Error;
use tokio::sync::oneshot;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The runner could not accept the task (e.g. no async runtime).
    #[error("Task runner unavailable")]
    RunnerUnavailable,

    /// The channel id no longer names a channel in the store.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Store error: {0}")]
    Store(String),

    /// The task ended without reporting a result.
    #[error("Delete task dropped before completing")]
    Dropped,
}

impl From<StoreError> for TaskError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownChannel(id) => Self::UnknownChannel(id),
            other => Self::Store(other.to_string()),
        }
    }
}

// ============================================================================
// Completion Signal
// ============================================================================

/// Result of a finished delete task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub channel_id: String,
    pub name: String,
}

/// Completion signal for a started delete task.
#[derive(Debug)]
pub struct DeleteCompletion {
    channel_id: String,
    rx: oneshot::Receiver<Result<DeleteOutcome, TaskError>>,
}

impl DeleteCompletion {
    /// Create a completion and the sender the task reports through.
    pub fn channel(
        channel_id: impl Into<String>,
    ) -> (oneshot::Sender<Result<DeleteOutcome, TaskError>>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            tx,
            Self {
                channel_id: channel_id.into(),
                rx,
            },
        )
    }

    /// A completion that has already settled with `result`.
    pub fn ready(channel_id: impl Into<String>, result: Result<DeleteOutcome, TaskError>) -> Self {
        let (tx, completion) = Self::channel(channel_id);
        // The receiver is alive in `completion`, so this cannot fail
        let _ = tx.send(result);
        completion
    }

    /// Id of the channel this task deletes.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Wait for the task to settle.
    pub async fn wait(self) -> Result<DeleteOutcome, TaskError> {
        self.rx.await.unwrap_or(Err(TaskError::Dropped))
    }
}

// ============================================================================
// Delete Trigger
// ============================================================================

/// Starts channel deletion tasks.
pub trait DeleteTrigger: Send + Sync {
    /// Start deleting `channel_id`'s on-device content.
    ///
    /// `Err` means the task could not be started at all.
    fn trigger_delete(&self, channel_id: &str) -> Result<DeleteCompletion, TaskError>;
}

/// Runs deletions against a [`ChannelStore`] on the tokio runtime.
#[derive(Clone)]
pub struct CatalogDeleteTrigger {
    store: ChannelStore,
}

impl CatalogDeleteTrigger {
    pub fn new(store: ChannelStore) -> Self {
        Self { store }
    }
}

impl DeleteTrigger for CatalogDeleteTrigger {
    fn trigger_delete(&self, channel_id: &str) -> Result<DeleteCompletion, TaskError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| TaskError::RunnerUnavailable)?;

        let (tx, completion) = DeleteCompletion::channel(channel_id);
        let store = self.store.clone();
        let channel_id = channel_id.to_string();

        tracing::debug!(channel_id = %channel_id, "Spawning delete task");
        runtime.spawn(async move {
            let result = store
                .remove_channel_content(&channel_id)
                .await
                .map(|channel| DeleteOutcome {
                    channel_id: channel.id,
                    name: channel.name,
                })
                .map_err(TaskError::from);

            if tx.send(result).is_err() {
                tracing::debug!(channel_id = %channel_id, "Delete completion dropped by caller");
            }
        });

        Ok(completion)
    }
}

// ============================================================================
// Tests
// ============================================================================
