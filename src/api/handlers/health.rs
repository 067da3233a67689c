//! Handler for health check endpoint.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::pipeline::Pipeline;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// The rate limiter fails open, so a degraded counter store does not stop
/// traffic; it is still reported here.
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "rate_limit_store": { "status": "ok", "message": "Reachable" },
///     "response_cache": { "status": "ok", "message": "Reachable" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(pipeline): State<Arc<Pipeline>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let (limiter_ok, cache_ok) = tokio::join!(
        pipeline.limiter().health_check(),
        pipeline.cache().health_check()
    );

    let checks = HealthChecks {
        rate_limit_store: check(limiter_ok, "Counter store"),
        response_cache: check(cache_ok, "Response cache"),
    };
    let all_healthy = checks.rate_limit_store.is_ok() && checks.response_cache.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

fn check(healthy: bool, component: &str) -> CheckStatus {
    if healthy {
        CheckStatus::ok(format!("{} reachable", component))
    } else {
        CheckStatus::error(format!("{} unreachable", component))
    }
}
