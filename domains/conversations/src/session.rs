//! Chat session: conversation store plus the relay calls feeding it
//!
//! Every relay call runs as its own tokio task keyed by the bot message id
//! it answers. Starting a new call for an id aborts the previous one, and a
//! generation token keeps a superseded call from writing to the store even
//! if it finishes before the abort lands.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use crate::domain::entities::{Message, MessageId, MAX_PROMPT_CHARS};
use crate::relay::RelayService;
use crate::store::{ConversationStore, StoreError};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Prompt is longer than {max} characters")]
    PromptTooLong { max: usize },

    #[error("A message is already being sent")]
    Busy,

    #[error("Message {0} has no failed reply to retry")]
    NoFailedReply(MessageId),

    #[error("Session closed")]
    Closed,

    #[error(transparent)]
    Store(#[from] StoreError),
}

struct InFlight {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Inner {
    store: Mutex<ConversationStore>,
    relay: Arc<dyn RelayService>,
    tasks: std::sync::Mutex<HashMap<MessageId, InFlight>>,
    sending: AtomicBool,
    generation: AtomicU64,
    updates: broadcast::Sender<Message>,
}

impl Inner {
    fn tasks(&self) -> MutexGuard<'_, HashMap<MessageId, InFlight>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, message: &Message) {
        // No subscribers is fine.
        let _ = self.updates.send(message.clone());
    }
}

/// Clears the compose flag when the compose-driven call ends, aborted or not
struct ComposeGuard(Arc<Inner>);

impl Drop for ComposeGuard {
    fn drop(&mut self) {
        self.0.sending.store(false, Ordering::Release);
    }
}

/// One chat session: created at session start, dropped at session end.
///
/// Dropping the session aborts every outstanding relay call.
pub struct ChatSession {
    inner: Arc<Inner>,
}

impl ChatSession {
    pub fn new(relay: Arc<dyn RelayService>) -> Self {
        Self::with_store(ConversationStore::new(), relay)
    }

    pub fn with_store(store: ConversationStore, relay: Arc<dyn RelayService>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(store),
                relay,
                tasks: std::sync::Mutex::new(HashMap::new()),
                sending: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                updates,
            }),
        }
    }

    /// Submit composed text: append the turn and start its relay call.
    ///
    /// Blank text and text over `MAX_PROMPT_CHARS` are rejected without
    /// touching the conversation. Only one compose-driven call may be
    /// outstanding at a time.
    pub async fn submit(&self, text: &str) -> Result<(Message, Message), SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyPrompt);
        }
        if text.chars().count() > MAX_PROMPT_CHARS {
            return Err(SessionError::PromptTooLong {
                max: MAX_PROMPT_CHARS,
            });
        }

        if self
            .inner
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::Busy);
        }
        let guard = ComposeGuard(Arc::clone(&self.inner));

        let mut store = self.inner.store.lock().await;
        let (user, bot) = store.append_turn(text)?;

        self.inner.publish(&user);
        self.inner.publish(&bot);

        tracing::info!(message_id = %bot.id, "Submitting prompt to relay");
        self.spawn_call(bot.id, text.to_string(), Some(guard));
        drop(store);

        Ok((user, bot))
    }

    /// Retry a failed bot reply with its original prompt
    pub async fn retry(&self, bot_id: MessageId) -> Result<Message, SessionError> {
        let mut store = self.inner.store.lock().await;
        self.retry_locked(&mut store, bot_id)
    }

    /// Retry the failed reply attached to a user message
    pub async fn retry_for_user(&self, user_id: MessageId) -> Result<Message, SessionError> {
        let mut store = self.inner.store.lock().await;
        let bot_id = store
            .failed_reply_for(user_id)
            .map(|m| m.id)
            .ok_or(SessionError::NoFailedReply(user_id))?;
        self.retry_locked(&mut store, bot_id)
    }

    fn retry_locked(
        &self,
        store: &mut ConversationStore,
        bot_id: MessageId,
    ) -> Result<Message, SessionError> {
        let prompt = store.retry(bot_id)?;
        let message = store
            .get(bot_id)
            .cloned()
            .ok_or(StoreError::NotFound(bot_id))?;

        self.inner.publish(&message);

        tracing::info!(message_id = %bot_id, "Retrying prompt");
        self.spawn_call(bot_id, prompt, None);

        Ok(message)
    }

    /// Start the relay call for `id`, superseding any call already running
    /// for it. Callers hold the store lock.
    fn spawn_call(&self, id: MessageId, prompt: String, compose: Option<ComposeGuard>) {
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);

        let mut tasks = self.inner.tasks();
        let handle = tokio::spawn(async move {
            let outcome = inner.relay.send(&prompt).await;

            let mut store = inner.store.lock().await;
            {
                let mut tasks = inner.tasks();
                match tasks.get(&id) {
                    Some(current) if current.generation == generation => {
                        tasks.remove(&id);
                    }
                    _ => {
                        tracing::debug!(message_id = %id, generation, "Dropping superseded relay result");
                        return;
                    }
                }
            }

            let updated = match outcome {
                Ok(reply) => store.resolve(id, &reply).cloned(),
                Err(e) => {
                    tracing::warn!(message_id = %id, error = %e, "Relay call failed");
                    store.fail(id).cloned()
                }
            };

            match updated {
                Ok(message) => inner.publish(&message),
                Err(e) => tracing::error!(message_id = %id, error = %e, "Failed to record relay outcome"),
            }

            // Compose flag clears before the store lock is released.
            drop(compose);
        });

        if let Some(previous) = tasks.insert(id, InFlight { generation, handle }) {
            tracing::debug!(message_id = %id, "Aborting superseded relay call");
            previous.handle.abort();
        }
    }

    /// Whether a compose-driven call is outstanding
    pub fn is_sending(&self) -> bool {
        self.inner.sending.load(Ordering::Acquire)
    }

    /// Number of relay calls currently outstanding
    pub fn in_flight(&self) -> usize {
        self.inner.tasks().len()
    }

    /// Copy of the conversation in display order
    pub async fn snapshot(&self) -> Vec<Message> {
        self.inner.store.lock().await.messages().to_vec()
    }

    pub async fn get(&self, id: MessageId) -> Option<Message> {
        self.inner.store.lock().await.get(id).cloned()
    }

    /// Most recent failed bot reply, if any
    pub async fn latest_failed(&self) -> Option<Message> {
        self.inner.store.lock().await.latest_failed().cloned()
    }

    /// Receive every message as it is created or changes
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.inner.updates.subscribe()
    }

    /// Wait until `id` is no longer pending and return it
    pub async fn wait_for(&self, id: MessageId) -> Result<Message, SessionError> {
        let mut updates = self.subscribe();
        loop {
            {
                let store = self.inner.store.lock().await;
                let message = store.get(id).ok_or(StoreError::NotFound(id))?;
                if !message.is_pending() {
                    return Ok(message.clone());
                }
            }

            match updates.recv().await {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return Err(SessionError::Closed),
            }
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        for (_, call) in self.inner.tasks().drain() {
            call.handle.abort();
        }
    }
}
