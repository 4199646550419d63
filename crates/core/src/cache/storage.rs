//! Store interface consumed by the cache manager.
//!
//! `CacheDb` is the production backend. The trait exists so that tests can
//! wrap it and count store interactions.

use super::connection::CacheDb;
use super::entries::{CachedResponse, RequestKey};
use crate::Error;
use async_trait::async_trait;

/// Named, versioned stores of captured responses.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the store if missing.
    async fn open(&self, name: &str) -> Result<(), Error>;

    async fn has(&self, name: &str) -> Result<bool, Error>;

    /// Store names in creation order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a whole store. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    async fn match_entry(&self, name: &str, key: &RequestKey) -> Result<Option<CachedResponse>, Error>;

    /// Look up a request across every store, oldest first.
    async fn match_any(&self, key: &RequestKey) -> Result<Option<CachedResponse>, Error>;

    /// Insert or overwrite one entry.
    async fn put(&self, name: &str, key: &RequestKey, response: &CachedResponse) -> Result<(), Error>;

    /// Insert or overwrite several entries atomically.
    async fn put_all(&self, name: &str, entries: &[(RequestKey, CachedResponse)]) -> Result<(), Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.open_store(name).await
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        self.has_store(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.store_names().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.delete_store(name).await
    }

    async fn match_entry(&self, name: &str, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        self.get_entry(name, key).await
    }

    async fn match_any(&self, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        self.find_entry(key).await
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &CachedResponse) -> Result<(), Error> {
        self.put_entry(name, key, response).await
    }

    async fn put_all(&self, name: &str, entries: &[(RequestKey, CachedResponse)]) -> Result<(), Error> {
        self.put_entries(name, entries).await
    }
}
