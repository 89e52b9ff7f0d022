//! Versioned backend command/event envelopes.

use serde::{Deserialize, Serialize};

/// Contract version for backend command/event envelopes.
pub const EVENT_VERSION: u32 = 1;

/// Push event carrying a [`crate::progress::DownloadProgressEvent`] payload.
pub const DOWNLOAD_PROGRESS_EVENT: &str = "download-progress";

/// Operations exposed by the backend process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "check-ollama-status")]
    CheckOllamaStatus,
    #[serde(rename = "get-models")]
    GetModels,
    #[serde(rename = "get-downloaded-models")]
    GetDownloadedModels,
    #[serde(rename = "chat-message")]
    ChatMessage,
    #[serde(rename = "clear-conversation")]
    ClearConversation,
    #[serde(rename = "get-conversation-history")]
    GetConversationHistory,
    #[serde(rename = "detect-external-drives")]
    DetectExternalDrives,
    #[serde(rename = "use-for-models")]
    UseForModels,
    #[serde(rename = "eject-drive")]
    EjectDrive,
    #[serde(rename = "download-model")]
    DownloadModel,
    #[serde(rename = "delete-model")]
    DeleteModel,
    #[serde(rename = "get-models-location")]
    GetModelsLocation,
    #[serde(rename = "open-models-location")]
    OpenModelsLocation,
}

impl CommandName {
    /// Every operation, in contract order.
    pub const ALL: [Self; 13] = [
        Self::CheckOllamaStatus,
        Self::GetModels,
        Self::GetDownloadedModels,
        Self::ChatMessage,
        Self::ClearConversation,
        Self::GetConversationHistory,
        Self::DetectExternalDrives,
        Self::UseForModels,
        Self::EjectDrive,
        Self::DownloadModel,
        Self::DeleteModel,
        Self::GetModelsLocation,
        Self::OpenModelsLocation,
    ];

    /// Render command name to wire format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CheckOllamaStatus => "check-ollama-status",
            Self::GetModels => "get-models",
            Self::GetDownloadedModels => "get-downloaded-models",
            Self::ChatMessage => "chat-message",
            Self::ClearConversation => "clear-conversation",
            Self::GetConversationHistory => "get-conversation-history",
            Self::DetectExternalDrives => "detect-external-drives",
            Self::UseForModels => "use-for-models",
            Self::EjectDrive => "eject-drive",
            Self::DownloadModel => "download-model",
            Self::DeleteModel => "delete-model",
            Self::GetModelsLocation => "get-models-location",
            Self::OpenModelsLocation => "open-models-location",
        }
    }

    /// Parse a command name from wire format.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }

    /// Number of positional arguments the operation takes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::CheckOllamaStatus
            | Self::GetModels
            | Self::GetDownloadedModels
            | Self::DetectExternalDrives
            | Self::GetModelsLocation
            | Self::OpenModelsLocation => 0,
            Self::ClearConversation | Self::GetConversationHistory | Self::DeleteModel => 1,
            Self::ChatMessage | Self::UseForModels | Self::EjectDrive | Self::DownloadModel => 2,
        }
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A versioned response envelope from backend -> frontend.
///
/// `ok == false` means the call was rejected before it produced a reply;
/// `error` then holds whatever the backend rejected with, which is not
/// guaranteed to be a string. `ok == true` carries the `{success, ...}`
/// reply object in `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    pub request_id: String,
    pub ok: bool,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl ResponseEnvelope {
    /// Build a delivered response envelope.
    #[must_use]
    pub fn ok(request_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: true,
            payload,
            error: None,
        }
    }

    /// Build a rejected response envelope.
    #[must_use]
    pub fn rejected(request_id: impl Into<String>, reason: serde_json::Value) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: false,
            payload: serde_json::Value::Null,
            error: Some(reason),
        }
    }
}

/// A versioned command envelope from frontend -> backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub v: u32,
    pub request_id: String,
    pub command: CommandName,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl CommandEnvelope {
    /// Build a v1 command envelope.
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        command: CommandName,
        args: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            command,
            args,
        }
    }

    /// Validate envelope version, identifiers and argument count.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.v != EVENT_VERSION {
            return Err(ContractError::new(
                ContractErrorKind::UnsupportedVersion,
                format!(
                    "unsupported contract version {}; expected {}",
                    self.v, EVENT_VERSION
                ),
            ));
        }
        if self.request_id.trim().is_empty() {
            return Err(ContractError::new(
                ContractErrorKind::InvalidEnvelope,
                "request_id cannot be empty".to_owned(),
            ));
        }
        let expected = self.command.arity();
        if self.args.len() != expected {
            return Err(ContractError::new(
                ContractErrorKind::InvalidArguments,
                format!(
                    "{} takes {expected} argument(s), got {}",
                    self.command,
                    self.args.len()
                ),
            ));
        }
        Ok(())
    }
}

/// A versioned push event from backend -> frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub v: u32,
    pub event_id: String,
    pub event: String,
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Build a v1 event envelope.
    #[must_use]
    pub fn new(
        event_id: impl Into<String>,
        event: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            event_id: event_id.into(),
            event: event.into(),
            payload,
        }
    }
}

/// Contract validation error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractErrorKind {
    UnsupportedVersion,
    InvalidEnvelope,
    InvalidArguments,
}

/// Contract validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractError {
    pub kind: ContractErrorKind,
    pub message: String,
}

impl ContractError {
    #[must_use]
    pub fn new(kind: ContractErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ContractError {}
