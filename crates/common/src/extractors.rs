//! Custom axum extractors for Relaychat

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection},
        FromRequest, Request,
    },
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::Error;

/// JSON extractor that validates the deserialized value automatically.
///
/// Requires `T: DeserializeOwned + Validate`. All input errors
/// (deserialization + validation) return 400. When a validation rule
/// carries a `message`, that message becomes the error payload verbatim.
///
/// A request without a JSON content type, or with an empty body, is read
/// as `{}`, so missing fields are reported by their validation rules.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

/// Rejection type for `ValidatedJson`:
/// - JSON deserialization errors → 400 (via `Error::Validation`)
/// - Validation errors → 400 (via `Error::Validation`)
#[derive(Debug)]
pub enum ValidatedJsonRejection {
    Body(BytesRejection),
    Json(JsonRejection),
    Validation(Error),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            ValidatedJsonRejection::Body(e) => Error::Validation(e.body_text()).into_response(),
            ValidatedJsonRejection::Json(e) => Error::Validation(e.body_text()).into_response(),
            ValidatedJsonRejection::Validation(e) => e.into_response(),
        }
    }
}

/// First human-readable message among the field errors, if any rule set one.
fn first_message(errors: &ValidationErrors) -> Option<String> {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(essence) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
    else {
        return false;
    };
    let essence = essence.trim().to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json_body = has_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Body)?;

        let body: &[u8] = if json_body && !bytes.trim_ascii().is_empty() {
            &bytes
        } else {
            b"{}"
        };
        let Json(value) = Json::<T>::from_bytes(body).map_err(ValidatedJsonRejection::Json)?;
        value.validate().map_err(|e| {
            let message =
                first_message(&e).unwrap_or_else(|| format!("Validation failed: {}", e));
            ValidatedJsonRejection::Validation(Error::Validation(message))
        })?;
        Ok(ValidatedJson(value))
    }
}
