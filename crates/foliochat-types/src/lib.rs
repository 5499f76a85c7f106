//! Shared domain types for foliochat.
//!
//! Message records, decoded stream events, wire shapes, the error
//! taxonomy, and API endpoint configuration. No I/O lives here.

pub mod chat;
pub mod config;
pub mod error;
pub mod event;
