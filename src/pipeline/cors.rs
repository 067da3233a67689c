//! Cross-origin request policy.

use std::collections::HashSet;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::Response;

const ALLOWED_METHODS: &str = "GET, HEAD, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "authorization, content-type, accept, api-version, x-api-key, x-correlation-id";
const EXPOSED_HEADERS: &str = "etag, retry-after, x-cache, x-correlation-id, x-ratelimit-limit, x-ratelimit-remaining, x-ratelimit-reset, api-supported-versions";
const PREFLIGHT_MAX_AGE_SECS: u32 = 600;

/// Origins permitted to call the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(HashSet<String>),
}

/// Result of checking a request against the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOutcome {
    /// No `Origin` header; nothing to do.
    SameOrigin,
    /// Cross-origin request from an allowed origin.
    Allowed(String),
    /// Preflight from an allowed origin; answer without touching the rest of the pipeline.
    Preflight(String),
    /// Origin not on the list.
    Rejected(String),
}

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origins: AllowedOrigins,
}

impl CorsPolicy {
    pub fn new(origins: AllowedOrigins) -> Self {
        Self { origins }
    }

    /// Builds a policy from a config list; `*` anywhere allows every origin.
    pub fn from_origins(origins: &[String]) -> Self {
        if origins.iter().any(|o| o.trim() == "*") {
            return Self::new(AllowedOrigins::Any);
        }
        Self::new(AllowedOrigins::List(
            origins.iter().map(|o| normalize_origin(o)).collect(),
        ))
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        match &self.origins {
            AllowedOrigins::Any => true,
            AllowedOrigins::List(list) => list.contains(&normalize_origin(origin)),
        }
    }

    pub fn evaluate(&self, method: &Method, headers: &HeaderMap) -> CorsOutcome {
        let Some(origin) = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok()) else {
            return CorsOutcome::SameOrigin;
        };
        let origin = origin.to_string();

        if !self.is_allowed(&origin) {
            return CorsOutcome::Rejected(origin);
        }

        if method == Method::OPTIONS && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD) {
            CorsOutcome::Preflight(origin)
        } else {
            CorsOutcome::Allowed(origin)
        }
    }

    /// Adds the allow-origin headers for an allowed cross-origin response.
    pub fn decorate(&self, headers: &mut HeaderMap, origin: &str) {
        match &self.origins {
            AllowedOrigins::Any => {
                headers.insert(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                );
            }
            AllowedOrigins::List(_) => {
                if let Ok(value) = HeaderValue::from_str(origin) {
                    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
                }
                headers.append(header::VARY, HeaderValue::from_static("origin"));
            }
        }
        headers.insert(
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static(EXPOSED_HEADERS),
        );
    }

    pub fn preflight_response(&self, origin: &str, request_headers: &HeaderMap) -> Response {
        let allow_headers = request_headers
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(ALLOWED_HEADERS));

        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;

        let headers = response.headers_mut();
        self.decorate(headers, origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from(PREFLIGHT_MAX_AGE_SECS),
        );

        response
    }
}

fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}
