//! Per-client fixed-window rate limiting.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, HeaderValue};

use crate::error::retry_after_seconds;
use crate::infrastructure::StoreError;
use crate::infrastructure::counters::CounterStore;

/// Requests allowed per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window: Duration,
}

/// Counter state reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowUsage {
    pub limit: u32,
    pub count: u64,
    pub resets_in: Duration,
}

impl WindowUsage {
    pub fn remaining(&self) -> u64 {
        u64::from(self.limit).saturating_sub(self.count)
    }

    /// Writes the `X-RateLimit-*` headers.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert("x-ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(self.remaining()));
        headers.insert(
            "x-ratelimit-reset",
            HeaderValue::from(retry_after_seconds(self.resets_in)),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Request may proceed. `usage` is `None` when the store was unavailable.
    Allowed { usage: Option<WindowUsage> },
    /// Limit exceeded; retry once the window closes.
    Throttled {
        retry_after: Duration,
        usage: WindowUsage,
    },
}

/// Counts requests per client identity against a [`RateLimitPolicy`].
///
/// Each call to [`RateLimiter::check`] increments the client's counter
/// exactly once. When the counter store fails or does not answer within
/// `timeout` the request is allowed and the degradation is logged.
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    policy: RateLimitPolicy,
    timeout: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, policy: RateLimitPolicy, timeout: Duration) -> Self {
        Self {
            store,
            policy,
            timeout,
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    pub async fn check(&self, client_id: &str) -> RateDecision {
        let hit = tokio::time::timeout(self.timeout, self.store.hit(client_id, self.policy.window))
            .await
            .unwrap_or_else(|_| Err(StoreError::Timeout(self.timeout.as_millis() as u64)));

        let window = match hit {
            Ok(window) => window,
            Err(e) => {
                metrics::counter!("rate_limit_degraded_total").increment(1);
                tracing::warn!(
                    client = client_id,
                    error = %e,
                    "counter store unavailable, allowing request"
                );
                return RateDecision::Allowed { usage: None };
            }
        };

        let usage = WindowUsage {
            limit: self.policy.limit,
            count: window.count,
            resets_in: window.resets_in,
        };

        if window.count > u64::from(self.policy.limit) {
            metrics::counter!("rate_limit_throttled_total").increment(1);
            tracing::debug!(client = client_id, count = window.count, "rate limit exceeded");
            RateDecision::Throttled {
                retry_after: window.resets_in.min(self.policy.window),
                usage,
            }
        } else {
            RateDecision::Allowed { usage: Some(usage) }
        }
    }

    pub async fn health_check(&self) -> bool {
        tokio::time::timeout(self.timeout, self.store.health_check())
            .await
            .unwrap_or(false)
    }
}
