//! Route definitions for the completion relay

use axum::{routing::post, Router};

use crate::handlers::ask;
use crate::RelayState;

/// Create the prompt relay routes
pub fn relay_routes() -> Router<RelayState> {
    Router::new().route("/ask", post(ask::ask))
}
