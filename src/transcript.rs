//! Chat transcript.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::format::format_message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
    System,
}

/// Generation details shown under an assistant reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageMetadata {
    pub model_name: String,
    pub response_time_ms: u64,
    pub token_count: Option<u64>,
}

/// One transcript entry. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    /// `text` rendered through [`format_message`].
    pub markup: String,
    pub timestamp: DateTime<Local>,
    pub metadata: Option<MessageMetadata>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            sender,
            markup: format_message(&text),
            text,
            timestamp: Local::now(),
            metadata: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Sender::System, text)
    }

    pub fn assistant(text: impl Into<String>, metadata: MessageMetadata) -> Self {
        Self {
            metadata: Some(metadata),
            ..Self::new(Sender::Assistant, text)
        }
    }

    /// `HH:MM` label for the message header.
    #[must_use]
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Append-only message list.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Messages sent by `sender`, in order.
    pub fn by_sender(&self, sender: Sender) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(move |m| m.sender == sender)
    }
}
