//! Infrastructure implementations for foliochat: HTTP transports over
//! reqwest and file-backed local persistence.

pub mod http;
pub mod kv;
pub mod sse;
