//! Top-level router.
//!
//! # Route Structure
//!
//! - `GET  /health`                         - Counter store and cache health
//! - `GET  /swagger/{version}/swagger.json` - Route description per version
//! - `/api`, `/api/*`                       - Everything else, through the pipeline
//!
//! # Middleware
//!
//! - **Correlation id** - Set on the request, echoed on the response
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api::handlers::{health_handler, swagger_handler};
use crate::api::middleware::tracing;
use crate::pipeline::{self, Pipeline};

/// Routes and layers without path normalization.
///
/// Layers run outermost first: correlation id, then tracing, then the
/// propagation back onto the response.
pub fn api_router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/swagger/{version}/swagger.json", get(swagger_handler))
        .route("/api", any(pipeline::handle))
        .route("/api/{*rest}", any(pipeline::handle))
        .with_state(pipeline)
        .layer(tracing::propagate_correlation_id())
        .layer(tracing::layer())
        .layer(tracing::set_correlation_id())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(pipeline: Arc<Pipeline>) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(api_router(pipeline))
}
