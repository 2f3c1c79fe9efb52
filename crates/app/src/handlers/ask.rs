//! Prompt relay handler

use axum::{extract::State, Json};
use relaychat_common::{Error, Result, ValidatedJson};
use relaychat_llm::{CompletionRequest, ProviderReply};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::RelayState;

/// Reply sent when the provider answered but no text could be found in it
pub const NO_RESPONSE_TEXT: &str = "No response text (see server logs)";

const PROMPT_REQUIRED: &str = "Prompt is required";
const PROMPT_NOT_TEXT: &str = "Prompt must be a string";

/// Request for relaying a prompt
#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    /// Any JSON value; `prompt_text` decides what counts as a prompt
    #[validate(required(message = "Prompt is required"))]
    pub prompt: Option<Value>,
}

/// The prompt to forward. Empty strings, `false` and `0` count as missing;
/// arrays, objects and other numbers or booleans are not prompts.
fn prompt_text(prompt: Option<Value>) -> Result<String> {
    match prompt {
        Some(Value::String(text)) if !text.is_empty() => Ok(text),
        None | Some(Value::Null) | Some(Value::String(_)) | Some(Value::Bool(false)) => {
            Err(Error::Validation(PROMPT_REQUIRED.to_string()))
        }
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {
            Err(Error::Validation(PROMPT_REQUIRED.to_string()))
        }
        Some(_) => Err(Error::Validation(PROMPT_NOT_TEXT.to_string())),
    }
}

/// Relay reply DTO
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AskResponse {
    pub reply: String,
}

/// Forward one prompt to the completion provider and return its text
pub async fn ask(
    State(state): State<RelayState>,
    ValidatedJson(req): ValidatedJson<AskRequest>,
) -> Result<Json<AskResponse>> {
    let prompt = prompt_text(req.prompt)?;

    tracing::debug!(prompt_len = prompt.len(), model = %state.model, "Relaying prompt");

    let response = state
        .llm
        .complete(CompletionRequest {
            model: state.model.clone(),
            prompt,
        })
        .await
        .map_err(|e| Error::Provider(e.to_string()))?;

    let reply = match response.reply {
        ProviderReply::TopLevelText(text)
        | ProviderReply::NestedText(text)
        | ProviderReply::CandidatePart(text) => {
            tracing::debug!(model = %response.model, reply_len = text.len(), "Provider replied");
            text
        }
        ProviderReply::Unrecognized(raw) => {
            tracing::warn!(
                model = %response.model,
                raw = %raw,
                "Provider response has no extractable text"
            );
            NO_RESPONSE_TEXT.to_string()
        }
    };

    Ok(Json(AskResponse { reply }))
}
