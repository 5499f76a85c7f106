//! Error taxonomy for the session client.
//!
//! Two layers are deliberately kept apart:
//!
//! - [`ChatError`] is the user-facing classification. Every variant's
//!   display string is shown verbatim in a failed message bubble.
//! - [`TransportFault`] is the network-level stream failure raised by the
//!   stream transport. It is the only signal that triggers the sync
//!   fallback; server-classified errors arrive as ordinary `error` events
//!   and are never retried.

use thiserror::Error;

/// User-visible failure classification for a turn.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("You're sending messages too fast. Please wait a moment.")]
    RateLimited,

    /// Server-supplied detail, or the generic message when the body had none.
    #[error("{0}")]
    Server(String),

    #[error("Streaming not supported by the server.")]
    StreamUnsupported,

    #[error("No response received. Please try again.")]
    EmptyTurn,

    #[error("Can't reach the server right now. The backend may be offline.")]
    Unreachable,

    #[error("Request timed out. The server took too long to respond.")]
    Timeout,

    #[error("Request cancelled.")]
    Cancelled,
}

impl ChatError {
    /// The generic server-error message used when no detail is available.
    pub const GENERIC: &'static str = "Something went wrong. Please try again later.";

    /// A `Server` error carrying the generic message.
    pub fn generic() -> Self {
        ChatError::Server(Self::GENERIC.to_string())
    }
}

/// Network-level fault raised by the stream transport.
///
/// Clean end-of-body and server-classified errors are NOT faults; only
/// these two variants propagate as stream errors, and only `Network`
/// ultimately reaches the sync fallback (a cancelled turn is finalized
/// in place).
#[derive(Debug, Error)]
pub enum TransportFault {
    #[error("connection failed: {0}")]
    Network(String),

    #[error("request cancelled")]
    Cancelled,
}

/// Errors from the local key-value persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(String),

    #[error("corrupt store: {0}")]
    Corrupt(String),
}
