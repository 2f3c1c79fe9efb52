//! Conversations domain: client-side message lifecycle over the completion relay

pub mod domain;
pub mod relay;
pub mod session;
pub mod store;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{
    Message, MessageId, MessageStatus, Sender, EMPTY_REPLY_TEXT, ERROR_TEXT, MAX_PROMPT_CHARS,
    PENDING_TEXT,
};
pub use domain::state::{MessageEvent, MessageStateMachine, StateError};

// Re-export client-side services
pub use relay::{HttpRelayClient, RelayConfig, RelayError, RelayService};
pub use session::{ChatSession, SessionError};
pub use store::{ConversationStore, StoreError};
