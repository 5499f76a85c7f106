//! Durable conversation identity.
//!
//! The identity is an opaque string correlating turns into one
//! server-side conversation. It survives process restarts via the
//! [`KvStore`] and is replaced (never mutated) on server rename, reset,
//! or clear. This component performs no network I/O.

use tracing::warn;
use uuid::Uuid;

use foliochat_types::error::StoreError;

use crate::store::KvStore;

/// Fixed persistence key for the conversation identity.
pub const THREAD_ID_KEY: &str = "chat_thread_id";

/// Owns the durable conversation identifier.
pub struct ThreadIdentityStore<K: KvStore> {
    store: K,
}

impl<K: KvStore> ThreadIdentityStore<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Return the persisted identity, creating and persisting a fresh one
    /// on first use. Never fails: a store error falls back to a fresh
    /// unpersisted identity so the session can proceed.
    pub async fn get(&self) -> String {
        match self.store.get(THREAD_ID_KEY).await {
            Ok(Some(id)) if !id.is_empty() => id,
            Ok(_) => self.seed().await,
            Err(e) => {
                warn!(error = %e, "thread identity store unreadable, using ephemeral id");
                Uuid::now_v7().to_string()
            }
        }
    }

    /// Persist `new_id` as the current identity (server-driven rename).
    pub async fn replace(&self, new_id: &str) {
        if let Err(e) = self.store.set(THREAD_ID_KEY, new_id).await {
            warn!(error = %e, "failed to persist renamed thread identity");
        }
    }

    /// Generate, persist, and return a fresh identity (reset/clear).
    pub async fn reset(&self) -> String {
        self.seed().await
    }

    async fn seed(&self) -> String {
        let id = Uuid::now_v7().to_string();
        if let Err(e) = self.store.set(THREAD_ID_KEY, &id).await {
            warn!(error = %e, "failed to persist new thread identity");
        }
        id
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryStore;
    use super::*;

    #[tokio::test]
    async fn test_get_creates_and_persists_on_first_use() {
        let identity = ThreadIdentityStore::new(MemoryStore::default());
        let id = identity.get().await;
        assert!(!id.is_empty());
        assert_eq!(identity.store.value(THREAD_ID_KEY), Some(id));
    }

    #[tokio::test]
    async fn test_get_is_stable() {
        let identity = ThreadIdentityStore::new(MemoryStore::default());
        let first = identity.get().await;
        let second = identity.get().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_replace_persists_server_rename() {
        let identity = ThreadIdentityStore::new(MemoryStore::default());
        identity.get().await;
        identity.replace("server-thread-7").await;
        assert_eq!(identity.get().await, "server-thread-7");
    }

    #[tokio::test]
    async fn test_reset_generates_previously_unused_id() {
        let identity = ThreadIdentityStore::new(MemoryStore::default());
        let old = identity.get().await;
        let fresh = identity.reset().await;
        assert_ne!(old, fresh);
        assert_eq!(identity.get().await, fresh);
    }

    #[tokio::test]
    async fn test_get_never_fails_on_store_error() {
        let identity = ThreadIdentityStore::new(MemoryStore::failing());
        let id = identity.get().await;
        assert!(!id.is_empty());
    }
}
