//! Relay HTTP Client Implementation
//!
//! POSTs a prompt to the completion relay at `{base_url}/ask` and returns
//! the reply text. One outbound call per `send`; retries are the caller's
//! decision.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000";

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    /// The call could not complete (connection refused, reset, DNS, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The relay answered with a non-success status
    #[error("Relay returned HTTP {0}")]
    Transport(u16),

    /// The relay answered 2xx with a body that is not the expected JSON
    #[error("Invalid relay response: {0}")]
    Decode(String),
}

/// Relay client configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub base_url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RELAY_URL.to_string(),
        }
    }
}

impl RelayConfig {
    /// Create relay config from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let base_url =
            std::env::var("RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string());
        Self { base_url }
    }
}

/// Anything that can turn a prompt into reply text
#[async_trait::async_trait]
pub trait RelayService: Send + Sync {
    async fn send(&self, prompt: &str) -> Result<String, RelayError>;
}

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct AskReply {
    #[serde(default)]
    reply: Option<String>,
}

/// Real HTTP client for the `/ask` relay endpoint
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    http: reqwest::Client,
    ask_url: String,
}

impl HttpRelayClient {
    /// Create a new relay client from configuration
    pub fn new(config: RelayConfig) -> Self {
        let ask_url = format!("{}/ask", config.base_url.trim_end_matches('/'));
        Self {
            http: reqwest::Client::new(),
            ask_url,
        }
    }

    pub fn ask_url(&self) -> &str {
        &self.ask_url
    }
}

#[async_trait::async_trait]
impl RelayService for HttpRelayClient {
    async fn send(&self, prompt: &str) -> Result<String, RelayError> {
        if prompt.is_empty() {
            return Err(RelayError::EmptyPrompt);
        }

        let response = self
            .http
            .post(&self.ask_url)
            .json(&AskRequest { prompt })
            .send()
            .await
            .map_err(|e| RelayError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Relay returned non-success status");
            return Err(RelayError::Transport(status.as_u16()));
        }

        let body: AskReply = response
            .json()
            .await
            .map_err(|e| RelayError::Decode(e.to_string()))?;

        Ok(body.reply.unwrap_or_default())
    }
}
