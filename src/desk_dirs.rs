//! Application directory paths.
//!
//! Uses the [`dirs`] crate for platform-appropriate resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Config | `~/Library/Application Support/ollama-desk/` | `~/.config/ollama-desk/` |
//!
//! `OLLAMA_DESK_CONFIG_DIR` overrides [`config_dir`] for tests and custom
//! deployments.

use std::path::PathBuf;

const APP_DIR: &str = "ollama-desk";

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/ollama-desk/` by default.
#[must_use]
pub fn config_dir() -> PathBuf {
    config_dir_with(std::env::var_os("OLLAMA_DESK_CONFIG_DIR").map(PathBuf::from))
}

fn config_dir_with(override_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir;
    }
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("/tmp/ollama-desk-config"))
}

/// Path to `config.toml`.
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
