//! In-memory credential store.

use async_trait::async_trait;
use dashmap::DashMap;

use super::TokenRecord;
use crate::error::Error;

/// Slot used when the authorization initiator supplies no key of its own.
pub const DEFAULT_SLOT: &str = "default";

/// Keyed credential store.
///
/// At most one record per key; a successful exchange for a key replaces the
/// previous record atomically from the caller's point of view. Implementations
/// must be safe for concurrent use.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Store a record under a key, replacing any previous record.
    async fn put(&self, key: &str, record: TokenRecord) -> Result<(), Error>;

    /// Retrieve the record for a key, if any.
    async fn get(&self, key: &str) -> Result<Option<TokenRecord>, Error>;

    /// Remove the record for a key. Idempotent.
    async fn remove(&self, key: &str) -> Result<(), Error>;

    /// Remove every record. Idempotent.
    async fn clear(&self) -> Result<(), Error>;
}

/// Process-lifetime store backed by a concurrent map. No persistence; a
/// restart drops every credential.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: DashMap<String, TokenRecord>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(&self, key: &str, record: TokenRecord) -> Result<(), Error> {
        self.records.insert(key.to_string(), record);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<TokenRecord>, Error> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        self.records.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.records.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use secrecy::{ExposeSecret, SecretString};

    fn record(token: &str) -> TokenRecord {
        TokenRecord {
            access_token: SecretString::from(token.to_string()),
            refresh_token: None,
            scope: None,
            expires_in: 3600,
            obtained_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemoryTokenStore::new();
        store.put(DEFAULT_SLOT, record("tok_a")).await.unwrap();

        let found = store.get(DEFAULT_SLOT).await.unwrap().unwrap();
        assert_eq!(found.access_token.expose_secret(), "tok_a");
    }

    #[tokio::test]
    async fn keys_are_isolated() {
        let store = MemoryTokenStore::new();
        store.put("host-a", record("tok_a")).await.unwrap();
        store.put("host-b", record("tok_b")).await.unwrap();

        // Overwriting one key leaves the other untouched.
        store.put("host-b", record("tok_b2")).await.unwrap();

        let a = store.get("host-a").await.unwrap().unwrap();
        let b = store.get("host-b").await.unwrap().unwrap();
        assert_eq!(a.access_token.expose_secret(), "tok_a");
        assert_eq!(b.access_token.expose_secret(), "tok_b2");
    }

    #[tokio::test]
    async fn put_replaces_previous_record() {
        let store = MemoryTokenStore::new();
        store.put(DEFAULT_SLOT, record("old")).await.unwrap();
        store.put(DEFAULT_SLOT, record("new")).await.unwrap();

        let found = store.get(DEFAULT_SLOT).await.unwrap().unwrap();
        assert_eq!(found.access_token.expose_secret(), "new");
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = MemoryTokenStore::new();
        store.put(DEFAULT_SLOT, record("tok")).await.unwrap();

        store.remove(DEFAULT_SLOT).await.unwrap();
        store.remove(DEFAULT_SLOT).await.unwrap();

        assert!(store.get(DEFAULT_SLOT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_removes_every_slot() {
        let store = MemoryTokenStore::new();
        store.put(DEFAULT_SLOT, record("tok")).await.unwrap();
        store.put("host-a", record("tok_a")).await.unwrap();

        store.clear().await.unwrap();

        assert!(store.get(DEFAULT_SLOT).await.unwrap().is_none());
        assert!(store.get("host-a").await.unwrap().is_none());
    }
}
