//! Redis-backed counter store.

use std::time::Duration;

use async_trait::async_trait;
use redis::{Script, aio::ConnectionManager};
use tracing::debug;

use super::service::{CounterStore, WindowCount};
use crate::infrastructure::{StoreError, StoreResult, redis_connection};

/// Increments the key, starts its expiry on the first hit of a window, and
/// returns `{count, remaining_ms}` in one atomic step.
const HIT_SCRIPT: &str = r"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
  redis.call('PEXPIRE', KEYS[1], ARGV[1])
end
local ttl = redis.call('PTTL', KEYS[1])
if ttl < 0 then
  redis.call('PEXPIRE', KEYS[1], ARGV[1])
  ttl = tonumber(ARGV[1])
end
return {count, ttl}
";

/// Fixed-window counters shared by every instance pointing at the same Redis.
///
/// Window expiry is delegated to Redis key TTLs, so no sweeping is needed.
pub struct RedisCounterStore {
    client: ConnectionManager,
    script: Script,
    key_prefix: String,
}

impl RedisCounterStore {
    pub fn new(client: ConnectionManager) -> Self {
        Self {
            client,
            script: Script::new(HIT_SCRIPT),
            key_prefix: "rl:".to_string(),
        }
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn hit(&self, key: &str, window: Duration) -> StoreResult<WindowCount> {
        let mut conn = self.client.clone();
        let window_ms = window.as_millis().max(1) as u64;

        let (count, ttl_ms): (u64, i64) = self
            .script
            .key(self.build_key(key))
            .arg(window_ms)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Operation(format!("Redis rate-limit script failed: {}", e)))?;

        debug!(key, count, ttl_ms, "Rate-limit hit recorded");

        Ok(WindowCount {
            count,
            resets_in: Duration::from_millis(ttl_ms.max(0) as u64),
        })
    }

    async fn health_check(&self) -> bool {
        redis_connection::ping(&self.client).await
    }
}
