//! Redis-backed response cache.

use async_trait::async_trait;
use redis::{AsyncCommands, Script, aio::ConnectionManager};
use tracing::debug;

use super::service::{CachedResponse, ResponseCacheStore, resource_root};
use crate::infrastructure::{StoreError, StoreResult, redis_connection};

/// Stores the entry, indexes it under its resource root, and keeps the index
/// alive at least as long as its longest-lived member.
const PUT_SCRIPT: &str = r"
redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[2])
redis.call('SADD', KEYS[2], ARGV[3])
if redis.call('TTL', KEYS[2]) < tonumber(ARGV[2]) then
  redis.call('EXPIRE', KEYS[2], ARGV[2])
end
return 1
";

/// Response cache shared by every instance pointing at the same Redis.
///
/// Entries are stored as JSON under `resp:<fingerprint>` with a Redis TTL.
/// Each entry's fingerprint is also added to an index set per resource root
/// (`resp-idx:hotels`), and prefix invalidation drops the whole root. This
/// over-invalidates deep prefixes, never under-invalidates. An index set
/// expires with the last entry it can still point at.
pub struct RedisCacheStore {
    client: ConnectionManager,
    put_script: Script,
    key_prefix: String,
    index_prefix: String,
}

impl RedisCacheStore {
    pub fn new(client: ConnectionManager) -> Self {
        Self {
            client,
            put_script: Script::new(PUT_SCRIPT),
            key_prefix: "resp:".to_string(),
            index_prefix: "resp-idx:".to_string(),
        }
    }

    fn build_key(&self, fingerprint: &str) -> String {
        format!("{}{}", self.key_prefix, fingerprint)
    }

    fn build_index_key(&self, path: &str) -> String {
        format!("{}{}", self.index_prefix, resource_root(path))
    }
}

#[async_trait]
impl ResponseCacheStore for RedisCacheStore {
    async fn get(&self, fingerprint: &str) -> StoreResult<Option<CachedResponse>> {
        let mut conn = self.client.clone();

        let raw: Option<String> = conn
            .get(self.build_key(fingerprint))
            .await
            .map_err(|e| StoreError::Operation(format!("Redis GET failed: {}", e)))?;

        match raw {
            Some(json) => {
                let entry = serde_json::from_str(&json)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                debug!("Cache HIT: {}", fingerprint);
                Ok(Some(entry))
            }
            None => {
                debug!("Cache MISS: {}", fingerprint);
                Ok(None)
            }
        }
    }

    async fn put(&self, fingerprint: &str, entry: CachedResponse) -> StoreResult<()> {
        let key = self.build_key(fingerprint);
        let index_key = self.build_index_key(&entry.resource_path);
        let ttl_seconds = entry.ttl.as_secs().max(1);
        let json =
            serde_json::to_string(&entry).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut conn = self.client.clone();
        self.put_script
            .key(&key)
            .key(&index_key)
            .arg(json)
            .arg(ttl_seconds)
            .arg(fingerprint)
            .invoke_async::<i64>(&mut conn)
            .await
            .map_err(|e| StoreError::Operation(format!("Redis SET failed: {}", e)))?;

        debug!("Cache SET: {} (TTL: {}s)", fingerprint, ttl_seconds);
        Ok(())
    }

    async fn remove(&self, fingerprint: &str) -> StoreResult<()> {
        let mut conn = self.client.clone();
        conn.del::<_, i64>(self.build_key(fingerprint))
            .await
            .map_err(|e| StoreError::Operation(format!("Redis DEL failed: {}", e)))?;
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let index_key = self.build_index_key(prefix);
        let mut conn = self.client.clone();

        let members: Vec<String> = conn
            .smembers(&index_key)
            .await
            .map_err(|e| StoreError::Operation(format!("Redis SMEMBERS failed: {}", e)))?;

        let mut keys: Vec<String> = members.iter().map(|fp| self.build_key(fp)).collect();
        keys.push(index_key);

        let removed: u64 = conn
            .del(&keys)
            .await
            .map_err(|e| StoreError::Operation(format!("Redis DEL failed: {}", e)))?;

        debug!("Cache INVALIDATE: {} ({} keys)", prefix, removed);
        Ok(members.len() as u64)
    }

    async fn health_check(&self) -> bool {
        redis_connection::ping(&self.client).await
    }
}
