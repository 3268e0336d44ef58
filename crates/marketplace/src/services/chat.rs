//! Mock chat with a farmer.
//!
//! Nothing leaves the process. Each message the user sends produces a
//! [`PendingReply`] that resolves, after a short random delay, into a canned
//! answer from the farmer. The caller awaits it and hands it back to
//! [`ChatSession::deliver`], which drops it if the chat was closed or moved
//! to another farmer in the meantime.

use std::time::Duration;

use rand::Rng;

use farm_connect_core::FarmerId;

use crate::config::DelayConfig;
use crate::images::{sanitize_image_url, sizes};
use crate::models::{ChatMessage, ChatSender, Farmer, User};

/// Sender name for a user without a first name.
const USER_FALLBACK_NAME: &str = "You";

/// Sender name for a farmer without a name.
const FARMER_FALLBACK_NAME: &str = "Farmer";

/// Characters of the user's message quoted in the mock reply.
const QUOTE_CHARS: usize = 20;

/// A chat window with one farmer.
#[derive(Debug, Clone)]
pub struct ChatSession {
    farmer: Farmer,
    user: Option<User>,
    messages: Vec<ChatMessage>,
    open: bool,
    delays: DelayConfig,
}

/// A farmer reply that has not arrived yet.
#[derive(Debug, Clone)]
#[must_use = "a pending reply does nothing unless resolved and delivered"]
pub struct PendingReply {
    farmer_id: FarmerId,
    message: ChatMessage,
    delay: Duration,
}

/// A farmer reply ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmerReply {
    pub farmer_id: FarmerId,
    pub message: ChatMessage,
}

impl PendingReply {
    /// How long the reply takes to arrive.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the reply.
    pub async fn resolve(self) -> FarmerReply {
        tokio::time::sleep(self.delay).await;
        FarmerReply {
            farmer_id: self.farmer_id,
            message: self.message,
        }
    }
}

impl ChatSession {
    /// Open a chat with `farmer`, starting with a system greeting.
    #[must_use]
    pub fn open(farmer: Farmer, current_user: Option<User>, delays: DelayConfig) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            farmer,
            user: current_user,
            open: true,
            delays,
        };
        session.greet();
        session
    }

    /// Switch the open chat to another farmer, discarding the history.
    pub fn reopen(&mut self, farmer: Farmer) {
        self.farmer = farmer;
        self.open = true;
        self.messages.clear();
        self.greet();
    }

    fn greet(&mut self) {
        let greeting = format!("Hi there! You are now chatting with {}.", self.farmer.name);
        self.messages
            .push(ChatMessage::new(ChatSender::System, "System", greeting));
    }

    /// Close the chat and clear its history.
    pub fn close(&mut self) {
        self.open = false;
        self.messages.clear();
        tracing::debug!(farmer_id = %self.farmer.id, "Chat closed");
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub const fn farmer(&self) -> &Farmer {
        &self.farmer
    }

    /// Messages in the order they were added.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append the user's message and schedule the farmer's reply.
    ///
    /// Returns `None`, and adds nothing, for blank text, a closed chat or
    /// when nobody is logged in.
    pub fn send(&mut self, text: &str) -> Option<PendingReply> {
        let text = text.trim();
        if text.is_empty() || !self.open {
            return None;
        }
        let user = self.user.as_ref()?;

        let sender_name = user
            .first_name
            .clone()
            .unwrap_or_else(|| USER_FALLBACK_NAME.to_string());
        self.messages.push(ChatMessage::new(
            ChatSender::User(user.id.clone()),
            sender_name,
            text,
        ));

        let quoted: String = text.chars().take(QUOTE_CHARS).collect();
        let reply = ChatMessage::new(
            ChatSender::Farmer(self.farmer.id.clone()),
            self.farmer_name(),
            format!(
                "Thanks for your message! I'll get back to you soon regarding \
                 \"{quoted}...\". (This is a mock reply)"
            ),
        );

        Some(PendingReply {
            farmer_id: self.farmer.id.clone(),
            message: reply,
            delay: self.reply_delay(),
        })
    }

    /// Append a resolved reply if the chat is still open with its farmer.
    ///
    /// Returns whether the reply was added.
    pub fn deliver(&mut self, reply: FarmerReply) -> bool {
        if !self.open || reply.farmer_id != self.farmer.id {
            tracing::debug!(farmer_id = %reply.farmer_id, "Dropping stale chat reply");
            return false;
        }
        self.messages.push(reply.message);
        true
    }

    /// Avatar for a message's sender; system messages have none.
    #[must_use]
    pub fn avatar_url(&self, message: &ChatMessage) -> Option<String> {
        let raw = match &message.sender {
            ChatSender::System => return None,
            ChatSender::User(_) => self
                .user
                .as_ref()
                .and_then(|user| user.profile_picture_url.as_deref()),
            ChatSender::Farmer(_) => self.farmer.profile_picture_url.as_deref(),
        };
        Some(sanitize_image_url(raw, sizes::AVATAR))
    }

    fn farmer_name(&self) -> String {
        if self.farmer.name.trim().is_empty() {
            FARMER_FALLBACK_NAME.to_string()
        } else {
            self.farmer.name.clone()
        }
    }

    fn reply_delay(&self) -> Duration {
        let min = self.delays.chat_reply_min;
        let max = self.delays.chat_reply_max;
        if max <= min {
            return min;
        }
        rand::rng().random_range(min..=max)
    }
}
