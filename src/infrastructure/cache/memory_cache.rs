//! In-process LRU response cache.

use std::sync::Arc;

use async_trait::async_trait;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use tracing::debug;

use super::service::{CachedResponse, ResponseCacheStore, path_has_prefix};
use crate::infrastructure::StoreResult;

/// Least-recently-used cache bounded by an approximate byte budget.
///
/// Entry weight is the serialized body plus headers; once the total weight
/// exceeds the budget the least recently used entries are evicted.
pub struct MemoryCacheStore {
    entries: Cache<String, Arc<CachedResponse>>,
    max_bytes: u64,
}

impl MemoryCacheStore {
    pub fn new(max_bytes: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_bytes)
            .weigher(|_key: &String, value: &Arc<CachedResponse>| value.weight())
            .eviction_policy(EvictionPolicy::lru())
            .build();

        debug!(max_bytes, "Using in-memory response cache");
        Self { entries, max_bytes }
    }

    /// Total weight currently held, after pending maintenance has run.
    pub fn weighted_size(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.weighted_size()
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }
}

#[async_trait]
impl ResponseCacheStore for MemoryCacheStore {
    async fn get(&self, fingerprint: &str) -> StoreResult<Option<CachedResponse>> {
        Ok(self
            .entries
            .get(fingerprint)
            .map(|entry| entry.as_ref().clone()))
    }

    async fn put(&self, fingerprint: &str, entry: CachedResponse) -> StoreResult<()> {
        self.entries.insert(fingerprint.to_string(), Arc::new(entry));
        Ok(())
    }

    async fn remove(&self, fingerprint: &str) -> StoreResult<()> {
        self.entries.invalidate(fingerprint);
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let stale: Vec<Arc<String>> = self
            .entries
            .iter()
            .filter(|(_, entry)| path_has_prefix(&entry.resource_path, prefix))
            .map(|(key, _)| key)
            .collect();

        for key in &stale {
            self.entries.invalidate(key.as_str());
        }

        Ok(stale.len() as u64)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
