use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Resolve the first present, non-null value among `keys`, in order.
///
/// The API reports the same field under different names depending on the
/// conversation source, so every record accessor goes through an ordered
/// candidate-key lookup.
pub fn first_present<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = value.as_object()?;
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|candidate| !candidate.is_null())
}

/// Render a field value for transcript output: strings verbatim, anything
/// else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read-only view over one conversation object from the API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationRecord {
    raw: Value,
}

impl ConversationRecord {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    fn text_field(&self, keys: &[&str]) -> Option<String> {
        first_present(&self.raw, keys).map(display_value)
    }

    pub fn id(&self) -> Option<String> {
        self.text_field(&["id"])
    }

    pub fn session_id(&self) -> Option<String> {
        self.text_field(&["sessionId"])
    }

    pub fn created_at(&self) -> Option<String> {
        self.text_field(&["createdAt"])
    }

    pub fn updated_at(&self) -> Option<String> {
        self.text_field(&["updatedAt"])
    }

    pub fn source(&self) -> Option<String> {
        self.text_field(&["source"])
    }

    pub fn user_id(&self) -> Option<String> {
        self.text_field(&["userId"])
    }

    /// Ordered message list, preferring `messages` and falling back to
    /// `transcript` when `messages` is absent or empty.
    pub fn messages(&self) -> Vec<MessageRecord> {
        let primary = self.message_list("messages");
        if primary.is_empty() {
            self.message_list("transcript")
        } else {
            primary
        }
    }

    fn message_list(&self, key: &str) -> Vec<MessageRecord> {
        self.raw
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().cloned().map(MessageRecord::new).collect())
            .unwrap_or_default()
    }
}

/// Read-only view over one message object within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageRecord {
    raw: Value,
}

impl MessageRecord {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// Speaker derived from the role label, with `sender` as the fallback key.
    pub fn speaker(&self) -> Speaker {
        let label = first_present(&self.raw, &["role", "sender"])
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        Speaker::from_label(label)
    }

    /// Message text, resolved from `content`, `message`, or `text`.
    pub fn content(&self) -> String {
        first_present(&self.raw, &["content", "message", "text"])
            .map(display_value)
            .unwrap_or_default()
    }

    /// Raw timestamp string, from `createdAt` with `timestamp` as fallback.
    pub fn timestamp(&self) -> Option<String> {
        first_present(&self.raw, &["createdAt", "timestamp"])
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn feedback(&self) -> Option<String> {
        first_present(&self.raw, &["feedback"]).map(display_value)
    }
}

/// Normalized speaker label for transcript lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
    Other(String),
}

impl Speaker {
    /// Case-insensitive mapping of the free-form role/sender label.
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "user" | "human" => Speaker::User,
            "assistant" | "bot" | "ai" | "agent" => Speaker::Bot,
            other => Speaker::Other(other.to_uppercase()),
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => f.write_str("USER"),
            Speaker::Bot => f.write_str("BOT"),
            Speaker::Other(label) => f.write_str(label),
        }
    }
}

#[derive(Error, Debug)]
pub enum ChatbaseError {
    #[error("API request failed with status {status}")]
    Api { status: u16, body: String },

    #[error("Request error: {0}")]
    Request(String),

    #[error("Failed to decode API response: {source}")]
    Decode {
        source: serde_json::Error,
        body: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChatbaseError>;
