//! Typed wrappers over the backend operations.

use crate::drives::{ActiveConfiguration, DriveDescriptor};
use crate::error::Result;
use crate::host::contract::CommandName;
use crate::host::gateway::{BackendGateway, BackendReply};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::sync::Arc;

/// A delivered reply, split into its payload or the domain refusal.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(DomainFailure),
}

/// A well-formed negative reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFailure {
    pub error: String,
    /// The backend refuses until an external drive is configured.
    pub requires_external_drive: bool,
}

impl DomainFailure {
    fn from_reply(reply: &BackendReply) -> Self {
        Self {
            error: reply.error().unwrap_or_else(|| "Unknown error".to_owned()),
            requires_external_drive: reply.flag("requiresExternalDrive"),
        }
    }
}

/// Reply of `check-ollama-status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OllamaStatus {
    pub installed: bool,
    pub running: bool,
}

/// Entry of `get-downloaded-models`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DownloadedModel {
    pub name: String,
    #[serde(default, deserialize_with = "size_label")]
    pub size: Option<String>,
}

/// Reply of `chat-message`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub tokens: Option<u64>,
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Deserialize)]
struct ModelNames {
    #[serde(default)]
    models: Vec<String>,
}

#[derive(Deserialize)]
struct DownloadedModels {
    #[serde(default)]
    models: Vec<DownloadedModel>,
}

#[derive(Deserialize)]
struct History {
    #[serde(default)]
    history: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Drives {
    #[serde(default)]
    drives: Vec<DriveDescriptor>,
}

#[derive(Deserialize)]
struct ModelsPath {
    #[serde(rename = "modelsPath", default)]
    models_path: String,
}

#[derive(Deserialize)]
struct OpenedPath {
    #[serde(default)]
    path: String,
}

/// Sizes arrive either as labels (`"3.8 GB"`) or raw byte counts.
fn size_label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Typed access to the backend call surface.
#[derive(Clone)]
pub struct BackendApi {
    gateway: Arc<dyn BackendGateway>,
}

impl BackendApi {
    #[must_use]
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self { gateway }
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<dyn BackendGateway> {
        &self.gateway
    }

    async fn outcome<T, F>(
        &self,
        command: CommandName,
        args: Vec<serde_json::Value>,
        extract: F,
    ) -> Result<Outcome<T>>
    where
        F: FnOnce(&BackendReply) -> Result<T>,
    {
        let reply = self.gateway.call(command, args).await?;
        if reply.is_success() {
            Ok(Outcome::Success(extract(&reply)?))
        } else {
            Ok(Outcome::Failure(DomainFailure::from_reply(&reply)))
        }
    }

    /// Status fields are read whether or not the reply claims success.
    pub async fn check_status(&self) -> Result<OllamaStatus> {
        let reply = self
            .gateway
            .call(CommandName::CheckOllamaStatus, Vec::new())
            .await?;
        reply.decode()
    }

    pub async fn get_models(&self) -> Result<Outcome<Vec<String>>> {
        self.outcome(CommandName::GetModels, Vec::new(), |r| {
            Ok(r.decode::<ModelNames>()?.models)
        })
        .await
    }

    pub async fn get_downloaded_models(&self) -> Result<Outcome<Vec<DownloadedModel>>> {
        self.outcome(CommandName::GetDownloadedModels, Vec::new(), |r| {
            Ok(r.decode::<DownloadedModels>()?.models)
        })
        .await
    }

    pub async fn chat_message(&self, text: &str, model: &str) -> Result<Outcome<ChatReply>> {
        self.outcome(
            CommandName::ChatMessage,
            vec![json!(text), json!(model)],
            BackendReply::decode,
        )
        .await
    }

    pub async fn clear_conversation(&self, model: &str) -> Result<Outcome<()>> {
        self.outcome(CommandName::ClearConversation, vec![json!(model)], |_| Ok(()))
            .await
    }

    pub async fn get_conversation_history(
        &self,
        model: &str,
    ) -> Result<Outcome<Vec<serde_json::Value>>> {
        self.outcome(
            CommandName::GetConversationHistory,
            vec![json!(model)],
            |r| Ok(r.decode::<History>()?.history),
        )
        .await
    }

    pub async fn detect_external_drives(&self) -> Result<Outcome<Vec<DriveDescriptor>>> {
        self.outcome(CommandName::DetectExternalDrives, Vec::new(), |r| {
            Ok(r.decode::<Drives>()?.drives)
        })
        .await
    }

    /// Returns the models path on the newly configured drive.
    pub async fn use_for_models(&self, drive_name: &str, drive_path: &str) -> Result<Outcome<String>> {
        self.outcome(
            CommandName::UseForModels,
            vec![json!(drive_name), json!(drive_path)],
            |r| Ok(r.decode::<ModelsPath>()?.models_path),
        )
        .await
    }

    pub async fn eject_drive(&self, drive_name: &str, force: bool) -> Result<Outcome<()>> {
        self.outcome(
            CommandName::EjectDrive,
            vec![json!(drive_name), json!(force)],
            |_| Ok(()),
        )
        .await
    }

    pub async fn download_model(&self, base_name: &str, variant: &str) -> Result<Outcome<()>> {
        self.outcome(
            CommandName::DownloadModel,
            vec![json!(base_name), json!(variant)],
            |_| Ok(()),
        )
        .await
    }

    pub async fn delete_model(&self, model: &str) -> Result<Outcome<()>> {
        self.outcome(CommandName::DeleteModel, vec![json!(model)], |_| Ok(()))
            .await
    }

    pub async fn get_models_location(&self) -> Result<Outcome<ActiveConfiguration>> {
        self.outcome(CommandName::GetModelsLocation, Vec::new(), BackendReply::decode)
            .await
    }

    /// Returns the path the backend opened.
    pub async fn open_models_location(&self) -> Result<Outcome<String>> {
        self.outcome(CommandName::OpenModelsLocation, Vec::new(), |r| {
            Ok(r.decode::<OpenedPath>()?.path)
        })
        .await
    }
}
