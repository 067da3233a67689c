//! Counter stores backing the rate limiter.
//!
//! Provides a [`CounterStore`] trait with two implementations:
//! - [`MemoryCounterStore`] - Sharded in-process map, lost on restart
//! - [`RedisCounterStore`] - Shared across instances via an atomic script

mod memory_store;
mod redis_store;
mod service;

pub use memory_store::MemoryCounterStore;
pub use redis_store::RedisCounterStore;
pub use service::{CounterStore, WindowCount};

#[cfg(test)]
pub use service::MockCounterStore;
