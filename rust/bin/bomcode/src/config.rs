//! Client-side configuration.
//!
//! Reads/writes `~/.bomcode/config.toml`:
//!
//! ```toml
//! store = "/var/lib/bomcode/counters.redb"
//!
//! [engine]
//! width = 4
//! parentLookup = "skipUnresolved"
//! inheritance = "disabled"
//! maxCommitAttempts = 3
//! ```

use std::path::{Path, PathBuf};

use bom::EngineConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Path to the redb counter store. Empty means `~/.bomcode/counters.redb`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub store: String,

    #[serde(default)]
    pub engine: EngineConfig,
}

impl ClientConfig {
    /// Default config file path: ~/.bomcode/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolved counter store path.
    pub fn store_path(&self) -> PathBuf {
        if self.store.is_empty() {
            dirs_path().join("counters.redb")
        } else {
            PathBuf::from(&self.store)
        }
    }
}

/// Return the bomcode config directory (~/.bomcode).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".bomcode")
}
