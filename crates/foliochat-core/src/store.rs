//! Key-value persistence trait.
//!
//! The session client persists exactly one thing locally: the durable
//! conversation identity. The interface stays a narrow string get/set so
//! the controller's logic never touches a real backend in tests.
//! Implementations live in foliochat-infra.

use foliochat_types::error::StoreError;

/// Narrow async key-value store (RPITIT, native async fn in traits).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
