//! No-op cache store for disabled caching.

use super::service::{CachedResponse, ResponseCacheStore};
use crate::infrastructure::StoreResult;
use async_trait::async_trait;
use tracing::debug;

/// A cache store that stores nothing.
///
/// Used when caching is disabled with `CACHE_ENABLED=false`. Every lookup is a
/// miss, so every request reaches its handler.
pub struct NullCacheStore;

impl NullCacheStore {
    pub fn new() -> Self {
        debug!("Using NullCacheStore (response caching disabled)");
        Self
    }
}

impl Default for NullCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseCacheStore for NullCacheStore {
    async fn get(&self, _fingerprint: &str) -> StoreResult<Option<CachedResponse>> {
        Ok(None)
    }

    async fn put(&self, _fingerprint: &str, _entry: CachedResponse) -> StoreResult<()> {
        Ok(())
    }

    async fn remove(&self, _fingerprint: &str) -> StoreResult<()> {
        Ok(())
    }

    async fn invalidate_prefix(&self, _prefix: &str) -> StoreResult<u64> {
        Ok(0)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
