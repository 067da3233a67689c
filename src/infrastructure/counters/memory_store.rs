//! In-process counter store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use super::service::{CounterStore, WindowCount};
use crate::infrastructure::StoreResult;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    started: Instant,
}

/// Fixed-window counters held in a sharded concurrent map.
///
/// Each key is updated under its shard's lock only, so hits for different
/// clients proceed in parallel. Counters are never persisted.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    windows: DashMap<String, Window>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Drops every window that has closed.
    pub fn purge_expired(&self, window: Duration) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < window);
        before.saturating_sub(self.windows.len())
    }

    /// Spawns a background task purging closed windows every `window`.
    pub fn spawn_sweeper(self: &Arc<Self>, window: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(window);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = store.purge_expired(window);
                if purged > 0 {
                    debug!(purged, "Purged expired rate-limit windows");
                }
            }
        })
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn hit(&self, key: &str, window: Duration) -> StoreResult<WindowCount> {
        let now = Instant::now();
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.duration_since(entry.started) >= window {
            entry.count = 0;
            entry.started = now;
        }
        entry.count += 1;

        Ok(WindowCount {
            count: entry.count,
            resets_in: window.saturating_sub(now.duration_since(entry.started)),
        })
    }

    async fn health_check(&self) -> bool {
        true
    }
}
