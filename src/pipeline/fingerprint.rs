//! Cache keys derived from the request.

use std::fmt;

use axum::http::{HeaderMap, Method, header};
use sha2::{Digest, Sha256};

use super::version_router::ApiVersion;

/// Whose view of a resource a cached response represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheScope {
    /// Same representation for every caller.
    Shared,
    /// Representation specific to one authenticated subject.
    Principal(String),
}

/// Request attributes that select a cached response.
#[derive(Debug, Clone)]
pub struct FingerprintInput<'a> {
    pub method: &'a Method,
    pub version: ApiVersion,
    pub route_path: &'a str,
    pub query: Option<&'a str>,
    pub headers: &'a HeaderMap,
    pub scope: &'a CacheScope,
}

/// Deterministic cache key, hex-encoded SHA-256.
///
/// Two requests that differ only in query parameter order or path case map
/// to the same fingerprint; requests under different private scopes never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(input: &FingerprintInput<'_>) -> Self {
        let accept = input
            .headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "*/*".to_string());
        let authorized = input.headers.contains_key(header::AUTHORIZATION);

        let mut hasher = Sha256::new();
        for part in [
            input.method.as_str(),
            &input.version.to_string(),
            &normalize_path(input.route_path),
            &normalize_query(input.query.unwrap_or("")),
            &accept,
            if authorized { "auth" } else { "anon" },
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        if let CacheScope::Principal(subject) = input.scope {
            hasher.update(b"principal:");
            hasher.update(subject.as_bytes());
        }

        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercases the path, collapses repeated slashes and drops a trailing one.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();

    format!("/{}", segments.join("/"))
}

/// Sorts query pairs so parameter order does not matter.
pub fn normalize_query(query: &str) -> String {
    let mut pairs: Vec<&str> = query.split('&').filter(|p| !p.is_empty()).collect();
    pairs.sort_unstable();
    pairs.join("&")
}
