//! Chat message types produced by the payload parsers

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Role;

/// A normalized message in a chat exchange
///
/// Produced only by the payload parsers; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Build a message from a raw JSON content value.
    ///
    /// Strings become text content; everything else is carried as
    /// structured content (tool-call payloads, multipart blocks).
    pub fn from_value(role: Role, content: Value) -> Self {
        let content = match content {
            Value::String(s) => MessageContent::Text(s),
            other => MessageContent::Data(other),
        };
        Self { role, content }
    }

    /// Get the text content of the message, if it is plain text.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(t) => Some(t),
            MessageContent::Data(_) => None,
        }
    }
}

/// Message content: plain text or a structured payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Data(Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}
