//! Infrastructure layer for shared stores and persistence.
//!
//! # Modules
//!
//! - [`counters`] - Rate-limit counter stores (in-memory and Redis)
//! - [`cache`] - Response cache stores (in-memory LRU, Redis and no-op)
//! - [`persistence`] - Repository implementations
//! - [`redis_connection`] - Redis connection setup shared by the Redis-backed stores

pub mod cache;
pub mod counters;
pub mod persistence;
pub mod redis_connection;

/// Errors reported by counter and cache stores.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store operation error: {0}")]
    Operation(String),

    #[error("store serialization error: {0}")]
    Serialization(String),

    #[error("store call timed out after {0}ms")]
    Timeout(u64),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
