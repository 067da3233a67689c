//! Machine-readable API description per version.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::pipeline::{ApiVersion, Pipeline};

/// Returns the OpenAPI-style document for one version.
///
/// # Endpoint
///
/// `GET /swagger/{version}/swagger.json`
///
/// Generated from the route registry, so it always matches what the
/// pipeline serves.
///
/// # Errors
///
/// Returns 404 for an unknown or unexposed version.
pub async fn swagger_handler(
    State(pipeline): State<Arc<Pipeline>>,
    Path(version): Path<String>,
) -> Result<Json<Value>, AppError> {
    let not_found = || AppError::not_found("Unknown API version", json!({ "version": version }));

    let version: ApiVersion = version.parse().map_err(|_| not_found())?;
    let group = pipeline.router().group(version).ok_or_else(not_found)?;

    Ok(Json(group.describe(pipeline.cache().default_ttl())))
}
