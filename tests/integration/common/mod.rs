//! Common test utilities for integration tests
//!
//! Starts a real relay on an ephemeral port backed by the programmable mock
//! completion service, so the client side talks plain HTTP to it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use relaychat_app::{create_app, RelayState};
use relaychat_conversations::{ChatSession, HttpRelayClient, RelayConfig};
use relaychat_llm::mock::{MockLlmService, MockOutcome};
use tokio::task::JoinHandle;

/// A relay server running for the duration of one test
pub struct TestRelay {
    pub addr: SocketAddr,
    pub mock: MockLlmService,
    server: JoinHandle<()>,
}

impl TestRelay {
    /// Start a relay whose provider echoes prompts
    pub async fn start() -> Result<Self> {
        Self::start_with(MockOutcome::Echo).await
    }

    /// Start a relay whose provider behaves as programmed
    pub async fn start_with(outcome: MockOutcome) -> Result<Self> {
        let mock = MockLlmService::with_outcome(outcome);
        let app = create_app(RelayState::new(Arc::new(mock.clone())));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("test relay stopped: {}", e);
            }
        });

        Ok(Self { addr, mock, server })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url())
    }

    /// Relay client pointed at this server
    pub fn client(&self) -> HttpRelayClient {
        HttpRelayClient::new(RelayConfig {
            base_url: self.base_url(),
        })
    }

    /// Chat session talking to this server
    pub fn session(&self) -> ChatSession {
        ChatSession::new(Arc::new(self.client()))
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.server.abort();
    }
}
