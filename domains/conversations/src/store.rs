//! In-memory conversation store
//!
//! Owns the ordered message list for one chat session. Messages are only
//! ever appended; bot messages are updated in place, one id at a time.

use thiserror::Error;

use crate::domain::entities::{
    Message, MessageId, MessageStatus, EMPTY_REPLY_TEXT, ERROR_TEXT, PENDING_TEXT,
};
use crate::domain::state::{MessageEvent, MessageStateMachine, StateError};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Message {0} not found")]
    NotFound(MessageId),

    #[error("Message {0} is not a bot message")]
    NotBotMessage(MessageId),

    #[error(transparent)]
    State(#[from] StateError),
}

/// Ordered, append-only list of messages with id-keyed status updates
#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    next_id: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a user message and its pending bot placeholder.
    ///
    /// Empty or whitespace-only prompts are rejected without touching the store.
    pub fn append_turn(&mut self, prompt: &str) -> Result<(Message, Message), StoreError> {
        if prompt.trim().is_empty() {
            return Err(StoreError::EmptyPrompt);
        }

        let user = Message::new_user(self.allocate_id(), prompt.to_string());
        let bot = Message::new_bot_placeholder(self.allocate_id(), prompt.to_string());

        self.messages.push(user.clone());
        self.messages.push(bot.clone());

        tracing::debug!(user_id = %user.id, bot_id = %bot.id, "Appended conversation turn");

        Ok((user, bot))
    }

    /// Mark a bot message done with the reply text
    pub fn resolve(&mut self, id: MessageId, reply: &str) -> Result<&Message, StoreError> {
        let text = if reply.is_empty() {
            EMPTY_REPLY_TEXT
        } else {
            reply
        };
        self.apply(id, MessageEvent::Resolve, text)
    }

    /// Mark a bot message failed
    pub fn fail(&mut self, id: MessageId) -> Result<&Message, StoreError> {
        self.apply(id, MessageEvent::Fail, ERROR_TEXT)
    }

    /// Reset a failed bot message to pending and return the prompt to resend
    pub fn retry(&mut self, id: MessageId) -> Result<String, StoreError> {
        let message = self.bot_message(id)?;
        let prompt = message.original_prompt.clone().ok_or_else(|| {
            StateError::GuardFailed(format!("message {} has no original prompt", id))
        })?;

        self.apply(id, MessageEvent::Retry, PENDING_TEXT)?;
        Ok(prompt)
    }

    fn apply(
        &mut self,
        id: MessageId,
        event: MessageEvent,
        text: &str,
    ) -> Result<&Message, StoreError> {
        let index = self.index_of(id)?;
        let message = &mut self.messages[index];
        if !message.is_bot() {
            return Err(StoreError::NotBotMessage(id));
        }

        let current = message.status.unwrap_or(MessageStatus::Pending);
        let next = MessageStateMachine::transition(current, event)?;

        message.status = Some(next);
        message.text = text.to_string();

        tracing::debug!(message_id = %id, from = %current, to = %next, "Bot message transitioned");

        Ok(message)
    }

    fn index_of(&self, id: MessageId) -> Result<usize, StoreError> {
        // Ids are handed out in insertion order, so the list is sorted by id.
        self.messages
            .binary_search_by_key(&id, |m| m.id)
            .map_err(|_| StoreError::NotFound(id))
    }

    fn bot_message(&self, id: MessageId) -> Result<&Message, StoreError> {
        let message = &self.messages[self.index_of(id)?];
        if message.is_bot() {
            Ok(message)
        } else {
            Err(StoreError::NotBotMessage(id))
        }
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.index_of(id).ok().map(|i| &self.messages[i])
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The failed reply to a user message, if its reply is in error.
    ///
    /// The reply is the first bot message after `user_id` whose original
    /// prompt matches the user text.
    pub fn failed_reply_for(&self, user_id: MessageId) -> Option<&Message> {
        let index = self.index_of(user_id).ok()?;
        let user = &self.messages[index];
        if user.is_bot() {
            return None;
        }

        self.messages[index + 1..]
            .iter()
            .find(|m| m.is_bot() && m.original_prompt.as_deref() == Some(user.text.as_str()))
            .filter(|m| m.is_failed())
    }

    /// Most recent bot message in error, if any
    pub fn latest_failed(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_failed())
    }
}
