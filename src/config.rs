//! Configuration file parser for ~/.config/chanman/config.toml.
//!
//! The file is optional. Unknown keys are skipped with a warning in the log.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Settings read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Channel catalog to load. Defaults to `channels.json` in the config
    /// directory when unset.
    pub catalog_path: Option<PathBuf>,

    /// Whether to refresh the channel list once the UI is up.
    pub refresh_on_start: bool,

    /// Seconds a status bar message stays visible.
    pub status_timeout_secs: u64,

    /// Action name to key string, e.g. `delete = "x"`.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            refresh_on_start: true,
            status_timeout_secs: 3,
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Largest config file accepted (1 MiB).
    const SIZE_LIMIT: u64 = 1 << 20;

    const KNOWN_KEYS: [&'static str; 4] = [
        "catalog_path",
        "refresh_on_start",
        "status_timeout_secs",
        "keybindings",
    ];

    /// Read `path` into a config.
    ///
    /// A missing or blank file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = read_optional(path, Self::SIZE_LIMIT)? else {
            tracing::debug!(path = %path.display(), "Config file absent, using defaults");
            return Ok(Self::default());
        };
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file blank, using defaults");
            return Ok(Self::default());
        }

        let table: toml::Table = content.parse()?;
        for key in table.keys().filter(|k| !Self::KNOWN_KEYS.contains(&k.as_str())) {
            tracing::warn!(key = %key, path = %path.display(), "Ignoring unknown config key");
        }

        let config: Config = toml::Value::Table(table).try_into()?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Catalog path, falling back to `channels.json` under `config_dir`.
    pub fn catalog_path_in(&self, config_dir: &Path) -> PathBuf {
        self.catalog_path
            .clone()
            .unwrap_or_else(|| config_dir.join("channels.json"))
    }
}

/// File contents, or `None` when the file does not exist.
fn read_optional(path: &Path, limit: u64) -> Result<Option<String>, ConfigError> {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if size > limit {
        return Err(ConfigError::TooLarge(format!(
            "{} is {} bytes, limit is {}",
            path.display(),
            size,
            limit
        )));
    }
    Ok(Some(std::fs::read_to_string(path)?))
}

// ============================================================================
// Tests
// ============================================================================
