//! Domain entities for the Conversations domain
//!
//! A conversation is a flat, ordered list of messages. User messages are
//! immutable once created; bot messages carry a lifecycle status and the
//! prompt that produced them so a failed reply can be requested again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text shown while a bot reply is outstanding
pub const PENDING_TEXT: &str = "...";

/// Text a bot message takes when its relay call fails
pub const ERROR_TEXT: &str = "⚠️ Something went wrong";

/// Text a bot message takes when the relay answers with an empty reply
pub const EMPTY_REPLY_TEXT: &str = "No reply";

/// Longest prompt the compose input accepts, in characters
pub const MAX_PROMPT_CHARS: usize = 500;

/// Sequence number of a message within one conversation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

/// Lifecycle status of a bot message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Done,
    Error,
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageStatus::Pending => write!(f, "pending"),
            MessageStatus::Done => write!(f, "done"),
            MessageStatus::Error => write!(f, "error"),
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    /// Set on bot messages only: the prompt to resend on retry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new user message
    pub fn new_user(id: MessageId, text: String) -> Self {
        Message {
            id,
            sender: Sender::User,
            text,
            status: None,
            original_prompt: None,
            created_at: Utc::now(),
        }
    }

    /// Create a pending bot placeholder answering `prompt`
    pub fn new_bot_placeholder(id: MessageId, prompt: String) -> Self {
        Message {
            id,
            sender: Sender::Bot,
            text: PENDING_TEXT.to_string(),
            status: Some(MessageStatus::Pending),
            original_prompt: Some(prompt),
            created_at: Utc::now(),
        }
    }

    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }

    pub fn is_pending(&self) -> bool {
        self.status == Some(MessageStatus::Pending)
    }

    pub fn is_failed(&self) -> bool {
        self.status == Some(MessageStatus::Error)
    }
}
