//! Per-request context: correlation id and pipeline state.

use std::fmt;
use std::future::Future;
use std::sync::LazyLock;

use axum::http::{HeaderMap, Method};
use rand::Rng;
use regex::Regex;
use tokio::time::Instant;

use crate::error::AppError;

/// Header carrying the correlation id in both directions.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

static CORRELATION_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]{8,128}$").unwrap());

tokio::task_local! {
    static CORRELATION_ID: String;
}

/// Generates a fresh 128-bit correlation id, hex encoded.
pub fn new_correlation_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Takes the client-supplied correlation id when well formed, else a new one.
pub fn correlation_id_from(headers: &HeaderMap) -> String {
    headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| CORRELATION_ID_PATTERN.is_match(v))
        .map(str::to_string)
        .unwrap_or_else(new_correlation_id)
}

/// Runs `fut` with `id` visible to [`current_correlation_id`].
pub async fn with_correlation_id<F: Future>(id: String, fut: F) -> F::Output {
    CORRELATION_ID.scope(id, fut).await
}

/// Correlation id of the request being processed on this task, if any.
pub fn current_correlation_id() -> Option<String> {
    CORRELATION_ID.try_with(|id| id.clone()).ok()
}

/// Position of a request in the pipeline.
///
/// `Rejected` is terminal and reachable from every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Received,
    CorsChecked,
    RateLimited,
    CacheChecked,
    Authenticated,
    Routed,
    Handled,
    Responded,
    Rejected,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Received => "received",
            PipelineState::CorsChecked => "cors_checked",
            PipelineState::RateLimited => "rate_limited",
            PipelineState::CacheChecked => "cache_checked",
            PipelineState::Authenticated => "authenticated",
            PipelineState::Routed => "routed",
            PipelineState::Handled => "handled",
            PipelineState::Responded => "responded",
            PipelineState::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Responded | PipelineState::Rejected)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks one request through the pipeline.
#[derive(Debug)]
pub struct RequestContext {
    pub correlation_id: String,
    pub method: Method,
    pub path: String,
    state: PipelineState,
    history: Vec<PipelineState>,
    started: Instant,
}

impl RequestContext {
    pub fn new(correlation_id: String, method: Method, path: String) -> Self {
        Self {
            correlation_id,
            method,
            path,
            state: PipelineState::Received,
            history: vec![PipelineState::Received],
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// States visited so far, in order.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn advance(&mut self, next: PipelineState) {
        debug_assert!(!self.state.is_terminal(), "request already finished");
        tracing::debug!(
            correlation_id = %self.correlation_id,
            from = %self.state,
            to = %next,
            "pipeline transition"
        );
        self.state = next;
        self.history.push(next);
    }

    /// Moves to `Rejected`, logging the failure kind.
    pub fn reject(&mut self, error: &AppError) {
        let at = self.state;
        self.advance(PipelineState::Rejected);
        if error.status().is_server_error() {
            tracing::warn!(
                correlation_id = %self.correlation_id,
                method = %self.method,
                path = %self.path,
                at = %at,
                code = error.code(),
                "request rejected"
            );
        } else {
            tracing::info!(
                correlation_id = %self.correlation_id,
                method = %self.method,
                path = %self.path,
                at = %at,
                code = error.code(),
                "request rejected"
            );
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_new_correlation_id_format() {
        let id = new_correlation_id();
        assert_eq!(id.len(), 32);
        assert!(CORRELATION_ID_PATTERN.is_match(&id));
        assert_ne!(id, new_correlation_id());
    }

    #[test]
    fn test_client_correlation_id_is_reused_when_valid() {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_HEADER, HeaderValue::from_static("req-12345678"));
        assert_eq!(correlation_id_from(&headers), "req-12345678");

        headers.insert(CORRELATION_HEADER, HeaderValue::from_static("bad id!"));
        assert_ne!(correlation_id_from(&headers), "bad id!");
    }

    #[tokio::test]
    async fn test_task_local_scope() {
        assert!(current_correlation_id().is_none());
        let seen = with_correlation_id("abcdef123".to_string(), async {
            current_correlation_id()
        })
        .await;
        assert_eq!(seen.as_deref(), Some("abcdef123"));
    }

    #[tokio::test]
    async fn test_history_records_transitions() {
        let mut ctx = RequestContext::new("c0ffee00".to_string(), Method::GET, "/api".to_string());
        ctx.advance(PipelineState::CorsChecked);
        ctx.reject(&AppError::throttled(std::time::Duration::from_secs(1)));

        assert_eq!(ctx.state(), PipelineState::Rejected);
        assert_eq!(
            ctx.history(),
            &[
                PipelineState::Received,
                PipelineState::CorsChecked,
                PipelineState::Rejected
            ]
        );
    }
}
