// Relaychat - Completion Relay Server

use std::net::SocketAddr;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use relaychat_app::{build_cors_layer, create_app, log_filter, RelayState};
use relaychat_common::config::{Config, BIND_HOST};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Tracing is not up yet; config errors surface through main's result.
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config))
        .pretty()
        .init();

    info!("Starting Relaychat completion relay");

    if config.gemini_api_key.is_empty() && config.llm_provider != "mock" {
        // Not fatal: the provider rejects the first request instead.
        tracing::warn!("GEMINI_API_KEY is not set");
    }

    let state = RelayState::from_config(&config).map_err(|e| {
        error!("Failed to create completion service: {}", e);
        e
    })?;

    info!(provider = %config.llm_provider, model = %state.model, "Completion service ready");

    let app = create_app(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(build_cors_layer())
            .into_inner(),
    );

    let addr = SocketAddr::new(BIND_HOST, config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running: http://{}", addr);
    info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
