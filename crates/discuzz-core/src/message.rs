//! Conversation message types.
//!
//! Messages are used both for the compose-flow interview transcript and for
//! delegate chat history, so the wire representation matches what the
//! generation endpoints expect (`"user" | "model" | "system"` roles).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the reader or post author.
    User,
    /// Message generated on the author's behalf.
    Model,
    /// System-generated message.
    System,
}

impl MessageRole {
    /// Wire/transcript label for this role (`USER`, `MODEL`, `SYSTEM`).
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "USER",
            MessageRole::Model => "MODEL",
            MessageRole::System => "SYSTEM",
        }
    }
}

/// A single message in a conversation history.
///
/// Ordering is insertion order; `id` is unique within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Identifier, unique within the owning conversation.
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Timestamp when the message was created.
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    /// Creates a message stamped with the current time.
    pub fn new(id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a message with the epoch timestamp.
    ///
    /// Used when a history is reconstructed rather than recorded live, so
    /// that reconstruction is deterministic.
    pub fn replayed(id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            timestamp: DateTime::UNIX_EPOCH,
        }
    }
}
