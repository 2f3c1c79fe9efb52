//! State machine for bot message status transitions
//!
//! Pending → Done | Error; Done | Error → Done | Error (latest outcome wins);
//! Error → Pending (retry).

pub use relaychat_common::StateError;

use super::entities::MessageStatus;

impl MessageStatus {
    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [MessageStatus] {
        match self {
            Self::Pending => &[Self::Done, Self::Error],
            Self::Done => &[Self::Done, Self::Error],
            Self::Error => &[Self::Done, Self::Error, Self::Pending],
        }
    }
}

/// Events that trigger message status transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageEvent {
    /// Relay answered with reply text
    Resolve,
    /// Relay call failed
    Fail,
    /// User asked for the reply again
    Retry,
}

impl std::fmt::Display for MessageEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolve => write!(f, "resolve"),
            Self::Fail => write!(f, "fail"),
            Self::Retry => write!(f, "retry"),
        }
    }
}

/// Bot message state machine
pub struct MessageStateMachine;

impl MessageStateMachine {
    /// Attempt a state transition
    pub fn transition(
        current: MessageStatus,
        event: MessageEvent,
    ) -> Result<MessageStatus, StateError> {
        let next = match (current, event) {
            (_, MessageEvent::Resolve) => MessageStatus::Done,
            (_, MessageEvent::Fail) => MessageStatus::Error,
            (MessageStatus::Error, MessageEvent::Retry) => MessageStatus::Pending,
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }
}
