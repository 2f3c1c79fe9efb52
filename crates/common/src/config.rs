//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::net::{IpAddr, Ipv4Addr};

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_PORT: u16 = 3000;

/// The relay listens on every interface so devices on the LAN can reach it.
pub const BIND_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Completion provider API key. Not validated here: a missing key
    /// surfaces as a provider-side error on the first request.
    pub gemini_api_key: String,

    /// Completion provider selection (gemini, mock)
    pub llm_provider: String,
    pub gemini_model: String,
    pub gemini_base_url: String,

    /// Runtime configuration. `rust_log` is the relay's tracing filter.
    pub rust_log: String,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("gemini_api_key", &"[REDACTED]")
            .field("llm_provider", &self.llm_provider)
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("rust_log", &self.rust_log)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            gemini_api_key: lookup("GEMINI_API_KEY").unwrap_or_default(),
            llm_provider: lookup("LLM_PROVIDER").unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "relaychat=debug".to_string()),
            port,
        })
    }
}
