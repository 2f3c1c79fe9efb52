//! Shared utilities, configuration, and error handling for Relaychat
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration management following 12-factor principles
//! - Error types and their HTTP wire representation
//! - Request extractors with validation
//! - State machine error types

pub mod config;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::Config;
pub use error::{Error, Result, GENERIC_ERROR_MESSAGE};
pub use extractors::ValidatedJson;
pub use state::StateError;
