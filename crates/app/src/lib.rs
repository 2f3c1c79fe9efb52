//! Relaychat application composition root
//!
//! Wires the completion service into the relay router.

pub mod handlers;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use relaychat_common::Config;
use relaychat_llm::{LlmConfig, LlmService, LlmServiceFactory};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

/// Application state for the relay
#[derive(Clone)]
pub struct RelayState {
    pub llm: Arc<dyn LlmService>,
    /// Model every prompt is sent to
    pub model: String,
}

impl RelayState {
    /// State that sends every prompt to the service's default model
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        let model = llm.default_model().to_string();
        Self { llm, model }
    }

    /// Build the completion service selected by configuration
    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let llm = LlmServiceFactory::create(LlmConfig::from_config(config))?;
        Ok(Self::new(Arc::from(llm)))
    }
}

/// Create the main application router with all routes
pub fn create_app(state: RelayState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Relaychat relay v0.0.1-SNAPSHOT" }),
        )
        .merge(routes::relay_routes())
        .with_state(state)
}

/// Any origin may call the relay; the mobile client runs from dev tooling.
pub fn build_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Tracing filter built from `RUST_LOG`; unparsable directives are skipped
pub fn log_filter(config: &Config) -> EnvFilter {
    EnvFilter::new(&config.rust_log)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
