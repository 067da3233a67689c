//! Response cache stores.
//!
//! Provides a [`ResponseCacheStore`] trait with three implementations:
//! - [`MemoryCacheStore`] - In-process LRU bounded by a byte budget
//! - [`RedisCacheStore`] - Shared Redis-backed store
//! - [`NullCacheStore`] - No-op implementation for disabled caching

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCacheStore;
pub use null_cache::NullCacheStore;
pub use redis_cache::RedisCacheStore;
pub use service::{CachedResponse, ResponseCacheStore, path_has_prefix, resource_root};

#[cfg(test)]
pub use service::MockResponseCacheStore;
