//! Fingerprint-keyed response cache with lazy expiry.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::Response;
use chrono::Utc;
use dashmap::DashMap;
use sha2::{Digest, Sha256};

use super::fingerprint::Fingerprint;
use crate::infrastructure::StoreError;
use crate::infrastructure::cache::{CachedResponse, ResponseCacheStore, resource_root};

/// Headers replayed from a cached entry.
const CONTENT_HEADERS: [header::HeaderName; 3] = [
    header::CONTENT_TYPE,
    header::CONTENT_LANGUAGE,
    header::CONTENT_ENCODING,
];

pub const X_CACHE: &str = "x-cache";

/// Cache front used by the orchestrator.
///
/// Store failures and timeouts degrade to a miss (lookups) or a skipped
/// write; they never fail the request.
///
/// Each resource root carries a generation that [`ResponseCache::invalidate`]
/// bumps. A read snapshots it before its handler runs and only stores its
/// response if no invalidation touched the root in between.
pub struct ResponseCache {
    store: Arc<dyn ResponseCacheStore>,
    generations: DashMap<String, u64>,
    default_ttl: Duration,
    timeout: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn ResponseCacheStore>, default_ttl: Duration, timeout: Duration) -> Self {
        Self {
            store,
            generations: DashMap::new(),
            default_ttl,
            timeout,
        }
    }

    /// Current invalidation generation for the root of `resource_path`.
    pub fn generation(&self, resource_path: &str) -> u64 {
        self.generations
            .get(resource_root(resource_path))
            .map(|g| *g)
            .unwrap_or(0)
    }

    fn bump(&self, prefix: &str) {
        *self
            .generations
            .entry(resource_root(prefix).to_string())
            .or_insert(0) += 1;
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| Err(StoreError::Timeout(self.timeout.as_millis() as u64)))
    }

    /// Returns a fresh entry, dropping it first if it has expired.
    pub async fn lookup(&self, fingerprint: &Fingerprint) -> Option<CachedResponse> {
        let found = match self.bounded(self.store.get(fingerprint.as_str())).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "response cache lookup failed, treating as miss");
                None
            }
        };

        match found {
            Some(entry) if entry.is_fresh() => {
                metrics::counter!("response_cache_hits_total").increment(1);
                Some(entry)
            }
            Some(_) => {
                if let Err(e) = self.bounded(self.store.remove(fingerprint.as_str())).await {
                    tracing::debug!(error = %e, "failed to drop expired cache entry");
                }
                metrics::counter!("response_cache_misses_total").increment(1);
                None
            }
            None => {
                metrics::counter!("response_cache_misses_total").increment(1);
                None
            }
        }
    }

    /// Stores `entry` for `ttl`, replacing any entry under the same fingerprint.
    ///
    /// `observed` is the generation read before the handler ran. The write is
    /// skipped if an invalidation has happened since, and undone if one lands
    /// while it is in flight.
    pub async fn store(
        &self,
        fingerprint: &Fingerprint,
        mut entry: CachedResponse,
        ttl: Duration,
        observed: u64,
    ) {
        if self.generation(&entry.resource_path) != observed {
            tracing::debug!(path = %entry.resource_path, "skipping store of invalidated response");
            return;
        }

        let resource_path = entry.resource_path.clone();
        entry.ttl = ttl;
        entry.created_at = Utc::now();
        if let Err(e) = self.bounded(self.store.put(fingerprint.as_str(), entry)).await {
            tracing::warn!(error = %e, "failed to store cached response");
            return;
        }

        if self.generation(&resource_path) != observed {
            tracing::debug!(path = %resource_path, "dropping response invalidated during store");
            if let Err(e) = self.bounded(self.store.remove(fingerprint.as_str())).await {
                tracing::warn!(error = %e, "failed to drop invalidated cache entry");
            }
        }
    }

    /// Drops every entry under each prefix. Returns how many were removed.
    ///
    /// Generations are bumped before the store is touched, so a concurrent
    /// [`ResponseCache::store`] either sees the bump or is swept up here.
    pub async fn invalidate(&self, prefixes: &[String]) -> u64 {
        for prefix in prefixes {
            self.bump(prefix);
        }

        let mut removed = 0;
        for prefix in prefixes {
            match self.bounded(self.store.invalidate_prefix(prefix)).await {
                Ok(n) => removed += n,
                Err(e) => tracing::error!(prefix, error = %e, "cache invalidation failed"),
            }
        }
        metrics::counter!("response_cache_invalidations_total").increment(removed);
        tracing::debug!(?prefixes, removed, "invalidated cached responses");
        removed
    }

    pub async fn health_check(&self) -> bool {
        tokio::time::timeout(self.timeout, self.store.health_check())
            .await
            .unwrap_or(false)
    }
}

/// Only successful idempotent reads the handler did not opt out of.
pub fn is_cacheable(method: &Method, status: StatusCode, headers: &HeaderMap) -> bool {
    if !matches!(*method, Method::GET | Method::HEAD) || status != StatusCode::OK {
        return false;
    }

    let opted_out = headers
        .get_all(header::CACHE_CONTROL)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|d| d.trim().to_ascii_lowercase())
        .any(|d| d == "no-cache" || d == "no-store" || d == "private");

    !opted_out
}

/// Strong entity tag over the body.
pub fn etag_for(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// True when an `If-None-Match` header matches `etag`.
pub fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|t| t.trim().trim_start_matches("W/"))
        .any(|t| t == "*" || t == etag)
}

/// Builds an entry from a handler response.
pub fn capture(
    status: StatusCode,
    headers: &HeaderMap,
    body: Bytes,
    resource_path: &str,
    ttl: Duration,
) -> CachedResponse {
    let replayed = CONTENT_HEADERS
        .iter()
        .filter_map(|name| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    CachedResponse {
        status: status.as_u16(),
        headers: replayed,
        etag: etag_for(&body),
        body,
        resource_path: resource_path.to_string(),
        created_at: Utc::now(),
        ttl,
    }
}

/// Rebuilds a response from a cached entry. HEAD gets no body.
pub fn replay(entry: &CachedResponse, method: &Method) -> Response {
    let body = if *method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(entry.body.clone())
    };

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::from_u16(entry.status).unwrap_or(StatusCode::OK);

    let headers = response.headers_mut();
    for (name, value) in &entry.headers {
        if let (Ok(name), Ok(value)) = (
            header::HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    if let Ok(etag) = HeaderValue::from_str(&entry.etag) {
        headers.insert(header::ETAG, etag);
    }
    headers.insert(X_CACHE, HeaderValue::from_static("HIT"));

    response
}
