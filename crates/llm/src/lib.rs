//! Relaychat Completion Service
//!
//! Provides single-prompt text completion with support for:
//! - Google Gemini `generateContent` REST API for production
//! - Mock completion service for testing and development
//! - An explicit model of the provider's response shapes

pub mod gemini;
pub mod mock;
pub mod response;

use relaychat_common::Config;
use thiserror::Error;

pub use response::ProviderReply;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM request error: {0}")]
    Request(String),

    #[error("LLM response error: {0}")]
    Response(String),

    #[error("LLM rate limit exceeded")]
    RateLimit,
}

/// A single completion request: one prompt, one model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier; empty means the service default
    pub model: String,
    pub prompt: String,
}

impl CompletionRequest {
    /// Request against the service's default model
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: String::new(),
            prompt: prompt.into(),
        }
    }
}

/// Provider answer, classified by shape
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub reply: ProviderReply,
    pub model: String,
}

/// Completion service configuration
#[derive(Clone)]
pub struct LlmConfig {
    /// Provider (gemini, mock)
    pub provider: String,
    pub api_key: String,
    pub default_model: String,
    pub base_url: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("default_model", &self.default_model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LlmConfig {
    /// Create LLM config from environment variables
    pub fn from_env() -> Result<Self, LlmError> {
        let config = Config::from_env().map_err(|e| LlmError::Configuration(e.to_string()))?;
        Ok(Self::from_config(&config))
    }

    /// Derive LLM settings from the relay configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            provider: config.llm_provider.clone(),
            api_key: config.gemini_api_key.clone(),
            default_model: config.gemini_model.clone(),
            base_url: Some(config.gemini_base_url.clone()),
        }
    }
}

/// Completion service trait for different providers
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Send one prompt to the provider and classify what comes back
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model used when a request leaves `model` empty
    fn default_model(&self) -> &str;
}

/// Factory for creating LlmService implementations
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create an LlmService based on configuration
    pub fn create(config: LlmConfig) -> Result<Box<dyn LlmService>, LlmError> {
        match config.provider.as_str() {
            "gemini" => {
                tracing::info!(model = %config.default_model, "Creating Gemini completion service");
                Ok(Box::new(gemini::GeminiService::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock completion service");
                Ok(Box::new(mock::MockLlmService::new()))
            }
            provider => Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}. Supported providers: gemini, mock",
                provider
            ))),
        }
    }
}
