//! Chat messages exchanged in a mock chat session.

use chrono::{DateTime, Utc};
use serde::Serialize;

use farm_connect_core::{FarmerId, MessageId, UserId};

/// Who wrote a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ChatSender {
    System,
    User(UserId),
    Farmer(FarmerId),
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub sender: ChatSender,
    pub sender_name: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub(crate) fn new(sender: ChatSender, sender_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            text: text.into(),
            sender,
            sender_name: sender_name.into(),
            timestamp: Utc::now(),
        }
    }

    /// Whether `user` wrote this message.
    #[must_use]
    pub fn is_from(&self, user: &UserId) -> bool {
        matches!(&self.sender, ChatSender::User(id) if id == user)
    }
}
