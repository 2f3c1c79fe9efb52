//! Message model and status transitions

pub mod entities;
pub mod state;
