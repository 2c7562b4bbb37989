//! Helper functions for UI operations.
//!
//! Background task spawning for store refreshes and delete completions,
//! plus panic capture for those tasks.

use crate::app::{App, AppEvent};
use crate::tasks::DeleteCompletion;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of a panicking task silently disappearing, the panic message is
/// returned as `Err(String)` so it can be reported as `AppEvent::TaskPanicked`.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic payload".to_string()
            }
        })
}

/// Send an event to the UI loop, logging if the loop has gone away.
async fn send_event(tx: &mpsc::Sender<AppEvent>, event: AppEvent) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(error = %e, "Channel send failed (receiver dropped)");
    }
}

/// Start a store refresh and show the loading indicator until it settles.
///
/// The refreshed collection reaches the grid through the store
/// subscription; the task itself only reports success or failure.
pub fn spawn_refresh(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.grid.is_loading() {
        app.set_status("Refresh already in progress");
        return;
    }

    app.grid.set_loading(true);
    app.needs_redraw = true;

    let store = app.store.clone();
    let tx = event_tx.clone();

    tracing::debug!("Spawning channel refresh task");
    app.refresh_handle = Some(tokio::spawn(async move {
        let event = match catch_task_panic(store.refresh()).await {
            Ok(Ok(channels)) => AppEvent::ChannelsRefreshed {
                count: channels.len(),
            },
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Channel refresh failed");
                AppEvent::RefreshFailed {
                    error: e.to_string(),
                }
            }
            Err(panic_msg) => {
                tracing::error!(task = "refresh", error = %panic_msg, "Background task panicked");
                AppEvent::TaskPanicked {
                    task: "refresh",
                    error: panic_msg,
                }
            }
        };
        send_event(&tx, event).await;
    }));
}

/// Wait for a delete task to settle and report its outcome to the UI loop.
pub(super) fn spawn_delete_watch(completion: DeleteCompletion, event_tx: &mpsc::Sender<AppEvent>) {
    let tx = event_tx.clone();
    let channel_id = completion.channel_id().to_string();

    tokio::spawn(async move {
        let event = match catch_task_panic(completion.wait()).await {
            Ok(Ok(outcome)) => AppEvent::ChannelDeleted {
                channel_id: outcome.channel_id,
                name: outcome.name,
            },
            Ok(Err(error)) => AppEvent::ChannelDeleteFailed { channel_id, error },
            Err(panic_msg) => {
                tracing::error!(
                    task = "delete_channel",
                    channel_id = %channel_id,
                    error = %panic_msg,
                    "Background task panicked"
                );
                AppEvent::TaskPanicked {
                    task: "delete_channel",
                    error: panic_msg,
                }
            }
        };
        send_event(&tx, event).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::config::Config;
    use crate::store::ChannelStore;
    use crate::tasks::{CatalogDeleteTrigger, DeleteOutcome, TaskError};
    use std::sync::Arc;

    fn test_app(channels: Vec<Channel>) -> App {
        let store = ChannelStore::in_memory(channels);
        let trigger = Arc::new(CatalogDeleteTrigger::new(store.clone()));
        App::new(store, trigger, &Config::default())
    }

    #[tokio::test]
    async fn test_catch_task_panic_ok() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_message() {
        let result: Result<(), String> = catch_task_panic(async { panic!("boom") }).await;
        assert_eq!(result, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_spawn_refresh_sets_loading_and_reports() {
        let mut app = test_app(vec![Channel::new("a", "A", 1, 1)]);
        let (tx, mut rx) = mpsc::channel(4);

        spawn_refresh(&mut app, &tx);
        assert!(app.grid.is_loading());

        match rx.recv().await {
            Some(AppEvent::ChannelsRefreshed { count }) => assert_eq!(count, 1),
            other => panic!("Expected ChannelsRefreshed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_spawn_refresh_while_loading_is_ignored() {
        let mut app = test_app(Vec::new());
        let (tx, mut rx) = mpsc::channel(4);
        app.grid.set_loading(true);

        spawn_refresh(&mut app, &tx);
        assert!(app.refresh_handle.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_watch_reports_success() {
        let (tx, mut rx) = mpsc::channel(4);
        let outcome = DeleteOutcome {
            channel_id: "a".to_string(),
            name: "Alpha".to_string(),
        };
        spawn_delete_watch(DeleteCompletion::ready("a", Ok(outcome)), &tx);

        match rx.recv().await {
            Some(AppEvent::ChannelDeleted { channel_id, name }) => {
                assert_eq!(channel_id, "a");
                assert_eq!(name, "Alpha");
            }
            other => panic!("Expected ChannelDeleted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_watch_reports_failure() {
        let (tx, mut rx) = mpsc::channel(4);
        spawn_delete_watch(
            DeleteCompletion::ready("gone", Err(TaskError::UnknownChannel("gone".into()))),
            &tx,
        );

        match rx.recv().await {
            Some(AppEvent::ChannelDeleteFailed { channel_id, error }) => {
                assert_eq!(channel_id, "gone");
                assert_eq!(error, TaskError::UnknownChannel("gone".into()));
            }
            other => panic!("Expected ChannelDeleteFailed, got {:?}", other),
        }
    }
}
