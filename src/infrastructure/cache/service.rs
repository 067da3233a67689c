//! Cache store trait and the stored entry type.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};

use crate::infrastructure::StoreResult;

/// A serialized response stored under a request fingerprint.
///
/// Entries are immutable once written; storing a new entry for the same
/// fingerprint replaces the old one.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    /// Content headers replayed on a hit (`content-type`, ...).
    pub headers: Vec<(String, String)>,
    #[serde(with = "body_base64")]
    pub body: Bytes,
    /// Strong validator derived from the body.
    pub etag: String,
    /// Version-less resource path (`/hotels/7`), used for invalidation.
    pub resource_path: String,
    pub created_at: DateTime<Utc>,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub ttl: Duration,
}

impl CachedResponse {
    /// True while `now` is before `created_at + ttl`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.ttl) {
            Ok(ttl) => now < self.created_at + ttl,
            Err(_) => true,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    /// Remaining lifetime, zero once stale.
    pub fn remaining_ttl(&self) -> Duration {
        let age = (Utc::now() - self.created_at).to_std().unwrap_or_default();
        self.ttl.saturating_sub(age)
    }

    /// Approximate memory footprint in bytes.
    pub fn weight(&self) -> u32 {
        let headers: usize = self.headers.iter().map(|(k, v)| k.len() + v.len()).sum();
        let total = self.body.len() + headers + self.etag.len() + self.resource_path.len() + 64;
        u32::try_from(total).unwrap_or(u32::MAX)
    }
}

/// True when `path` equals `prefix` or continues it at a segment boundary.
///
/// `/hotels` covers `/hotels` and `/hotels/7` but not `/hotelsx`.
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

/// First path segment, used to group entries for invalidation.
pub fn resource_root(path: &str) -> &str {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
}

/// Store for cached responses keyed by request fingerprint.
///
/// Freshness is checked by the caller; stores may additionally expire
/// entries on their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseCacheStore: Send + Sync {
    /// Returns the entry stored under `fingerprint`, if any.
    async fn get(&self, fingerprint: &str) -> StoreResult<Option<CachedResponse>>;

    /// Stores `entry`, replacing any previous entry for `fingerprint`.
    async fn put(&self, fingerprint: &str, entry: CachedResponse) -> StoreResult<()>;

    /// Removes the entry for `fingerprint`.
    async fn remove(&self, fingerprint: &str) -> StoreResult<()>;

    /// Removes every entry whose resource path falls under `prefix`.
    ///
    /// Implementations may remove more than strictly necessary, never less.
    /// Returns the number of removed entries.
    async fn invalidate_prefix(&self, prefix: &str) -> StoreResult<u64>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}

/// Serde adapter storing bodies as standard base64 text.
mod body_base64 {
    use axum::body::Bytes;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(body: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}
