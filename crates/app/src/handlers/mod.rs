//! HTTP handlers for the completion relay

pub mod ask;
