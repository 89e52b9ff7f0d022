//! Runtime connection indicator.

use serde::Serialize;

use crate::host::api::OllamaStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    /// No check has completed yet.
    #[default]
    Unknown,
    Online,
    NotRunning,
    NotInstalled,
    /// The status call itself failed.
    ErrorChecking,
}

impl ConnectionState {
    #[must_use]
    pub fn from_status(status: OllamaStatus) -> Self {
        match (status.installed, status.running) {
            (true, true) => Self::Online,
            (true, false) => Self::NotRunning,
            (false, _) => Self::NotInstalled,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Checking...",
            Self::Online => "Online",
            Self::NotRunning => "Ollama not running",
            Self::NotInstalled => "Ollama not installed",
            Self::ErrorChecking => "Error checking status",
        }
    }
}
