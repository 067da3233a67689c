//! Counter store trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::infrastructure::StoreResult;

/// State of one client's fixed window after a hit was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    /// Requests counted in the current window, including this one.
    pub count: u64,
    /// Time until the current window closes.
    pub resets_in: Duration,
}

/// Per-key fixed-window counters.
///
/// `hit` must be an atomic read-modify-write per key: concurrent hits on the
/// same key are never lost or double-counted, and unrelated keys never
/// contend on a shared lock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Records one request for `key` and returns the window state.
    ///
    /// A window that started at least `window` ago is reset before counting.
    async fn hit(&self, key: &str, window: Duration) -> StoreResult<WindowCount>;

    /// Checks if the store is reachable.
    async fn health_check(&self) -> bool;
}
