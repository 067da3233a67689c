//! Client identity used to key rate limit counters.

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::application::services::Principal;

type HmacSha256 = Hmac<Sha256>;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Who a request is counted against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientIdentity {
    /// A registered API key, stored as a short digest.
    ApiKey(String),
    /// Subject of a valid bearer token.
    Subject(String),
    /// Network address of the caller.
    Address(String),
}

impl ClientIdentity {
    /// Stable counter key; the variant prefix keeps namespaces apart.
    pub fn key(&self) -> String {
        match self {
            ClientIdentity::ApiKey(digest) => format!("key:{}", digest),
            ClientIdentity::Subject(subject) => format!("sub:{}", subject),
            ClientIdentity::Address(ip) => format!("ip:{}", ip),
        }
    }
}

/// Known API keys, held only as HMAC-SHA256 digests.
pub struct ApiKeyRegistry {
    secret: Vec<u8>,
    known: HashSet<String>,
}

impl ApiKeyRegistry {
    pub fn new(secret: &str, keys: &[String]) -> Self {
        let mut registry = Self {
            secret: secret.as_bytes().to_vec(),
            known: HashSet::new(),
        };
        let digests: HashSet<String> = keys
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(|k| registry.digest(k))
            .collect();
        registry.known = digests;
        registry
    }

    fn digest(&self, key: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(key.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Returns a short digest for a registered key, `None` otherwise.
    pub fn recognize(&self, key: &str) -> Option<String> {
        let digest = self.digest(key.trim());
        self.known.contains(&digest).then(|| digest[..16].to_string())
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

/// Resolves [`ClientIdentity`] in order: API key, token subject, address.
pub struct IdentityResolver {
    api_keys: ApiKeyRegistry,
    behind_proxy: bool,
}

impl IdentityResolver {
    pub fn new(api_keys: ApiKeyRegistry, behind_proxy: bool) -> Self {
        Self {
            api_keys,
            behind_proxy,
        }
    }

    pub fn resolve(
        &self,
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
        principal: Option<&Principal>,
    ) -> ClientIdentity {
        if let Some(digest) = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|k| self.api_keys.recognize(k))
        {
            return ClientIdentity::ApiKey(digest);
        }

        if let Some(principal) = principal {
            return ClientIdentity::Subject(principal.subject.clone());
        }

        ClientIdentity::Address(self.client_ip(headers, peer))
    }

    /// Forwarding headers are trusted only when running behind a proxy.
    fn client_ip(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        if self.behind_proxy {
            let forwarded = headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            let real_ip = headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty());

            if let Some(ip) = forwarded.or(real_ip) {
                return ip.to_string();
            }
        }

        peer.map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
