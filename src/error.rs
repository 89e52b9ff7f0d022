//! Error types for the desk controller.

use crate::host::gateway::Rejection;

/// Top-level error type for the desk controller.
///
/// Only [`DeskError::Transport`] is produced by a backend call that never
/// completed. A well-formed `{success: false}` reply is *not* an error; it is
/// returned as a [`crate::host::gateway::BackendReply`] and surfaced to the
/// user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    /// The backend call itself was rejected (backend unreachable, crashed, or
    /// refused the envelope).
    #[error("backend transport error: {0}")]
    Transport(Rejection),

    /// Malformed envelope or reply payload.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Direct model-runtime HTTP query failed.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeskError {
    /// Human-readable message suitable for a system message or alert.
    ///
    /// For transport failures this is the unwrapped rejection text, without
    /// the `backend transport error:` prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(rejection) => rejection.message(),
            other => other.to_string(),
        }
    }
}

impl From<Rejection> for DeskError {
    fn from(rejection: Rejection) -> Self {
        Self::Transport(rejection)
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, DeskError>;
