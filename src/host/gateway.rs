//! The request/response + push-event boundary every other component uses.
//!
//! Callers must keep the two failure classes apart: a call that returns
//! `Err(DeskError::Transport(_))` never reached a backend handler (treat the
//! backend as unreachable), while `Ok(reply)` with `reply.is_success() == false`
//! is a well-formed refusal to show to the user.

use crate::error::{DeskError, Result};
use crate::host::contract::{CommandName, EventEnvelope};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

/// Whatever a rejected call was rejected with.
///
/// The transport does not guarantee a uniform shape, so the raw JSON value
/// is kept and unwrapped on demand by [`rejection_message`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    reason: serde_json::Value,
}

impl Rejection {
    #[must_use]
    pub fn new(reason: serde_json::Value) -> Self {
        Self { reason }
    }

    /// Rejection carrying a plain string reason.
    #[must_use]
    pub fn text(reason: impl Into<String>) -> Self {
        Self::new(serde_json::Value::String(reason.into()))
    }

    #[must_use]
    pub fn reason(&self) -> &serde_json::Value {
        &self.reason
    }

    /// Best-effort human-readable message.
    #[must_use]
    pub fn message(&self) -> String {
        rejection_message(&self.reason)
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Extract a message from a rejected value.
///
/// Order: a bare string, then an object's string `error`, then an object's
/// string `message`, then a compact JSON dump of whatever arrived.
#[must_use]
pub fn rejection_message(reason: &serde_json::Value) -> String {
    match reason {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(s)) = map.get("error") {
                return s.clone();
            }
            if let Some(serde_json::Value::String(s)) = map.get("message") {
                return s.clone();
            }
            reason.to_string()
        }
        serde_json::Value::Null => "Unknown error".to_owned(),
        other => other.to_string(),
    }
}

/// A delivered backend reply: `{success: true, ...payload}` or
/// `{success: false, error, ...flags}`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    body: serde_json::Map<String, serde_json::Value>,
}

impl BackendReply {
    /// Wrap a reply payload. Non-object payloads are kept under `value`.
    #[must_use]
    pub fn from_payload(payload: serde_json::Value) -> Self {
        let body = match payload {
            serde_json::Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("value".to_owned(), other);
                map
            }
        };
        Self { body }
    }

    /// Successful reply with the given extra fields.
    #[must_use]
    pub fn success(fields: serde_json::Value) -> Self {
        let mut reply = Self::from_payload(fields);
        reply
            .body
            .insert("success".to_owned(), serde_json::Value::Bool(true));
        reply
    }

    /// Domain failure with an error message.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::from_payload(serde_json::json!({"success": false, "error": error.into()}))
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.flag("success")
    }

    /// The domain error text, if any.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.body.get("error").map(rejection_message)
    }

    /// Boolean field, `false` when absent or not a bool.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.body
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.body.get(key)
    }

    /// Decode the whole reply object into a typed payload.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(serde_json::Value::Object(self.body.clone()))
            .map_err(|e| DeskError::Protocol(format!("unexpected reply shape: {e}")))
    }
}

/// The backend boundary.
///
/// Implementations perform no retries and no timeout handling.
#[async_trait]
pub trait BackendGateway: Send + Sync + 'static {
    /// Invoke a backend operation with positional arguments.
    async fn call(&self, command: CommandName, args: Vec<serde_json::Value>)
    -> Result<BackendReply>;

    /// Subscribe to fire-and-forget push events.
    fn subscribe_events(&self) -> broadcast::Receiver<EventEnvelope>;
}
