//! Google Gemini API Implementation
//!
//! Calls the Gemini `generateContent` endpoint
//! (https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent)
//! using reqwest HTTP client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{CompletionRequest, CompletionResponse, LlmConfig, LlmError, LlmService, ProviderReply};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";

/// Gemini generateContent request body
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// Gemini API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: u16,
    message: String,
    #[serde(default)]
    status: String,
}

/// Gemini completion service implementation
pub struct GeminiService {
    client: Client,
    config: LlmConfig,
    base_url: String,
}

impl GeminiService {
    /// Create a new Gemini service
    pub fn new(config: LlmConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            client: Client::new(),
            config,
            base_url,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            API_VERSION,
            model
        )
    }
}

#[async_trait::async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model
        };

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt,
                }],
            }],
        };

        let url = self.endpoint(&model);

        tracing::debug!(model = %model, "Sending Gemini API request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimit);
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            // Try to parse as API error
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
                return Err(LlmError::Response(format!(
                    "Gemini API error ({} {}): {}",
                    error_response.error.code,
                    error_response.error.status,
                    error_response.error.message
                )));
            }

            return Err(LlmError::Response(format!(
                "Gemini API returned {}: {}",
                status, error_body
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Response(format!("Failed to parse response: {}", e)))?;

        let reply = ProviderReply::classify(raw);

        tracing::debug!(model = %model, shape = reply.shape(), "Gemini API response received");

        Ok(CompletionResponse { reply, model })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
