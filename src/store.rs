//! Channel store backed by a JSON catalog file.
//!
//! The store owns the raw channel collection and publishes every new version
//! through a `tokio::sync::watch` channel. Views subscribe to it instead of
//! reading shared state directly.
//!
//! Content removal is kept in memory for the lifetime of the store and is
//! re-applied on every refresh; the catalog file itself is never written.
use crate::channel::Channel;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read channel catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid channel catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Channel catalog too large: {0}")]
    TooLarge(String),

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),
}

/// Accepted catalog layouts: a bare array or `{ "channels": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<Channel>),
    Wrapped { channels: Vec<Channel> },
}

impl CatalogFile {
    fn into_channels(self) -> Vec<Channel> {
        match self {
            Self::List(channels) | Self::Wrapped { channels } => channels,
        }
    }
}

/// Parse catalog JSON into a channel collection.
pub fn parse_catalog(content: &str) -> Result<Vec<Channel>, StoreError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let catalog: CatalogFile = serde_json::from_str(content)?;
    Ok(catalog.into_channels())
}

// ============================================================================
// Channel Store
// ============================================================================

/// Shared handle to the device's channel collection. Cloning is cheap.
#[derive(Clone)]
pub struct ChannelStore {
    path: Option<PathBuf>,
    tx: Arc<watch::Sender<Arc<Vec<Channel>>>>,
    /// Channel ids whose on-device content was removed this session.
    removed: Arc<Mutex<HashSet<String>>>,
}

impl ChannelStore {
    /// Maximum catalog file size (4 MB).
    const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

    /// Open the store from a catalog file.
    ///
    /// A missing file yields an empty store so the grid can show its
    /// empty state instead of failing at startup.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let channels = read_catalog(&path).await?;
        tracing::info!(path = %path.display(), channels = channels.len(), "Opened channel store");
        let (tx, _) = watch::channel(Arc::new(channels));
        Ok(Self {
            path: Some(path),
            tx: Arc::new(tx),
            removed: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    /// Create a store over a fixed collection with no backing file.
    pub fn in_memory(channels: Vec<Channel>) -> Self {
        let (tx, _) = watch::channel(Arc::new(channels));
        Self {
            path: None,
            tx: Arc::new(tx),
            removed: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Current raw collection.
    pub fn snapshot(&self) -> Arc<Vec<Channel>> {
        Arc::clone(&*self.tx.borrow())
    }

    /// Observe every collection the store publishes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Channel>>> {
        self.tx.subscribe()
    }

    /// Re-read the catalog and publish the result.
    ///
    /// Stores without a backing file republish their current collection.
    pub async fn refresh(&self) -> Result<Arc<Vec<Channel>>, StoreError> {
        let mut channels = match &self.path {
            Some(path) => read_catalog(path).await?,
            None => self.snapshot().as_ref().clone(),
        };
        // Removals and publication happen under one lock so a concurrent
        // delete is either applied here or published after this refresh.
        let removed = self.lock_removed();
        apply_removals(&removed, &mut channels);
        let channels = Arc::new(channels);
        self.tx.send_replace(Arc::clone(&channels));
        drop(removed);
        tracing::debug!(channels = channels.len(), "Channel store refreshed");
        Ok(channels)
    }

    /// Mark a channel's on-device content as removed and publish.
    pub async fn remove_channel_content(&self, channel_id: &str) -> Result<Channel, StoreError> {
        let mut removed_ids = self.lock_removed();
        let mut removed = None;
        self.tx.send_if_modified(|channels| {
            let Some(pos) = channels.iter().position(|c| c.id == channel_id) else {
                return false;
            };
            let list = Arc::make_mut(channels);
            let channel = &mut list[pos];
            channel.on_device_resources = 0;
            channel.on_device_file_size = 0;
            removed = Some(channel.clone());
            true
        });

        match removed {
            Some(channel) => {
                removed_ids.insert(channel.id.clone());
                drop(removed_ids);
                tracing::info!(channel_id, name = %channel.name, "Removed channel content");
                Ok(channel)
            }
            None => {
                tracing::warn!(channel_id, "Delete requested for unknown channel");
                Err(StoreError::UnknownChannel(channel_id.to_string()))
            }
        }
    }

    fn lock_removed(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // A poisoned set is still a valid set of ids
        self.removed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn apply_removals(removed: &HashSet<String>, channels: &mut [Channel]) {
    for channel in channels.iter_mut().filter(|c| removed.contains(&c.id)) {
        channel.on_device_resources = 0;
        channel.on_device_file_size = 0;
    }
}

async fn read_catalog(path: &Path) -> Result<Vec<Channel>, StoreError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.len() > ChannelStore::MAX_FILE_SIZE => {
            return Err(StoreError::TooLarge(format!(
                "Catalog is {} bytes (max {} bytes)",
                meta.len(),
                ChannelStore::MAX_FILE_SIZE
            )));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No channel catalog found, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(StoreError::Io(e)),
        Ok(_) => {}
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_catalog(&content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_catalog(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chanman_store_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("channels.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_bare_array() {
        let channels =
            parse_catalog(r#"[{"id": "a", "name": "A", "on_device_resources": 1}]"#).unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].on_device_resources, 1);
    }

    #[test]
    fn test_parse_wrapped() {
        let channels = parse_catalog(r#"{"channels": [{"id": "a", "name": "A"}]}"#).unwrap();
        assert_eq!(channels[0].id, "a");
    }

    #[test]
    fn test_parse_blank_is_empty() {
        assert!(parse_catalog("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid() {
        let err = parse_catalog("{not json").unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let store = ChannelStore::open("/tmp/chanman_test_nonexistent/channels.json")
            .await
            .unwrap();
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_open_and_refresh() {
        let path = temp_catalog("refresh", r#"[{"id": "a", "name": "A"}]"#);
        let store = ChannelStore::open(&path).await.unwrap();
        assert_eq!(store.snapshot().len(), 1);

        std::fs::write(&path, r#"[{"id": "a", "name": "A"}, {"id": "b", "name": "B"}]"#).unwrap();
        let refreshed = store.refresh().await.unwrap();
        assert_eq!(refreshed.len(), 2);
        assert_eq!(store.snapshot().len(), 2);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_too_large_catalog_rejected() {
        let path = temp_catalog("too_large", &" ".repeat(4 * 1024 * 1024 + 1));
        let result = ChannelStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::TooLarge(_))));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_remove_publishes_to_subscribers() {
        let store = ChannelStore::in_memory(vec![Channel::new("a", "A", 4, 8)]);
        let mut rx = store.subscribe();

        let removed = store.remove_channel_content("a").await.unwrap();
        assert_eq!(removed.on_device_resources, 0);

        assert!(rx.has_changed().unwrap());
        let published = Arc::clone(&*rx.borrow_and_update());
        assert_eq!(published[0].on_device_resources, 0);
        assert_eq!(published[0].total_resources, 8);
    }

    #[tokio::test]
    async fn test_remove_unknown_channel() {
        let store = ChannelStore::in_memory(vec![Channel::new("a", "A", 4, 8)]);
        let mut rx = store.subscribe();
        let err = store.remove_channel_content("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownChannel(ref id) if id == "missing"));
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_removal_survives_refresh() {
        let path = temp_catalog(
            "removal",
            r#"[{"id": "a", "name": "A", "on_device_resources": 3, "total_resources": 3}]"#,
        );
        let store = ChannelStore::open(&path).await.unwrap();
        store.remove_channel_content("a").await.unwrap();

        let refreshed = store.refresh().await.unwrap();
        assert_eq!(refreshed[0].on_device_resources, 0);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
