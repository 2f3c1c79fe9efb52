//! Mock Completion Service Implementation
//!
//! Programmable mock used by `LlmServiceFactory` when provider is `"mock"`
//! and by relay tests:
//! - `MockLlmService`: configurable mock with request recording
//! - `MockOutcome`: Echo, Reply, or Fail

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmService, ProviderReply};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

const MOCK_MODEL: &str = "mock-model";

/// What the mock should answer
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MockOutcome {
    /// Answer `Mock response to: <prompt>` as top-level text
    #[default]
    Echo,
    /// Answer with the given reply shape
    Reply(ProviderReply),
    /// Fail with a response error carrying this detail
    Fail(String),
}

/// Mock completion service for testing
#[derive(Debug, Clone, Default)]
pub struct MockLlmService {
    outcome: Arc<RwLock<MockOutcome>>,
    history: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLlmService {
    /// Create a new echoing mock service
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock service with a preset outcome
    pub fn with_outcome(outcome: MockOutcome) -> Self {
        let service = Self::default();
        service.set_outcome(outcome);
        service
    }

    /// Configure the mock outcome
    pub fn set_outcome(&self, outcome: MockOutcome) {
        *self
            .outcome
            .write()
            .unwrap_or_else(PoisonError::into_inner) = outcome;
    }

    /// Read current outcome
    pub fn outcome(&self) -> MockOutcome {
        self.outcome
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get recorded completion requests
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::info!("Mock LLM service processing completion request");

        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let model = if request.model.is_empty() {
            MOCK_MODEL.to_string()
        } else {
            request.model
        };

        let reply = match self.outcome() {
            MockOutcome::Echo => {
                ProviderReply::TopLevelText(format!("Mock response to: {}", request.prompt))
            }
            MockOutcome::Reply(reply) => reply,
            MockOutcome::Fail(detail) => return Err(LlmError::Response(detail)),
        };

        Ok(CompletionResponse { reply, model })
    }

    fn default_model(&self) -> &str {
        MOCK_MODEL
    }
}
