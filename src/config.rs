//! Configuration types for the desk controller.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{DeskError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub runtime: RuntimeConfig,
    pub backend: BackendConfig,
    pub timing: TimingConfig,
}

/// Local model runtime, queried directly only as a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Base URL of the runtime HTTP API.
    pub api_url: String,
    /// Per-request timeout for the direct query.
    pub timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:11434".to_owned(),
            timeout_secs: 5,
        }
    }
}

/// Backend process and channel sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Program spawned as the backend. It speaks JSON lines on stdin/stdout.
    pub command: String,
    pub args: Vec<String>,
    /// Buffered push events per subscriber before lagging.
    pub event_capacity: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            command: "ollama-desk-backend".to_owned(),
            args: Vec::new(),
            event_capacity: 256,
        }
    }
}

/// Cadences and delays, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub status_poll_secs: u64,
    pub home_stats_secs: u64,
    /// Drive rescan while the settings view is open.
    pub drive_poll_secs: u64,
    /// How long transient labels (download results, completed progress)
    /// stay visible.
    pub display_delay_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            status_poll_secs: 30,
            home_stats_secs: 30,
            drive_poll_secs: 3,
            display_delay_secs: 3,
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub fn status_poll(&self) -> Duration {
        Duration::from_secs(self.status_poll_secs.max(1))
    }

    #[must_use]
    pub fn home_stats(&self) -> Duration {
        Duration::from_secs(self.home_stats_secs.max(1))
    }

    #[must_use]
    pub fn drive_poll(&self) -> Duration {
        Duration::from_secs(self.drive_poll_secs.max(1))
    }

    #[must_use]
    pub fn display_delay(&self) -> Duration {
        Duration::from_secs(self.display_delay_secs)
    }
}

impl DeskConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| DeskError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| DeskError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/ollama-desk/config.toml`.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        crate::desk_dirs::config_file()
    }

    /// Load from `path` when it exists, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }
}
