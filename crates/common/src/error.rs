//! Common error types and handling for Relaychat

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to clients for every server-side failure.
///
/// The underlying cause is logged, never sent over the wire.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong.";

/// Common error type for the relay
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl Error {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code used in logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Provider(_) => "PROVIDER_ERROR",
        }
    }

    /// Message that is safe to hand back to the caller
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal errors with full context
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(code = self.error_code(), error = %self, "Internal server error");
        }

        let body = Json(json!({ "error": self.public_message() }));

        (status, body).into_response()
    }
}
