//! Application error taxonomy and its HTTP mapping.
//!
//! Every pipeline stage and handler converts its internal failure into an
//! [`AppError`] before it reaches the client. The JSON body always has the shape
//!
//! ```json
//! { "error": { "code": "not_found", "message": "...", "details": {}, "correlation_id": "..." } }
//! ```
//!
//! Dependency and internal failures are logged with full detail and surfaced
//! to the client with a generic message only.

use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::application::services::AuthError;
use crate::domain::repositories::RepositoryError;
use crate::pipeline::context::current_correlation_id;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Client-visible error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation { message: String, details: Value },

    #[error("authentication failed: {reason}")]
    Unauthorized { reason: AuthError },

    #[error("forbidden: {message}")]
    Forbidden { message: String, details: Value },

    #[error("rate limit exceeded, retry after {retry_after:?}")]
    Throttled { retry_after: Duration },

    #[error("not found: {message}")]
    NotFound { message: String, details: Value },

    #[error("conflict: {message}")]
    Conflict { message: String, details: Value },

    /// Downstream store or service failure. `detail` is server-side only.
    #[error("dependency failure: {detail}")]
    Dependency { detail: String },

    /// Unexpected failure. `detail` is server-side only.
    #[error("internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(reason: AuthError) -> Self {
        Self::Unauthorized { reason }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn throttled(retry_after: Duration) -> Self {
        Self::Throttled { retry_after }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn dependency(detail: impl Into<String>) -> Self {
        Self::Dependency {
            detail: detail.into(),
        }
    }
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    /// Taxonomy code reported in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::Unauthorized { .. } => "auth_error",
            AppError::Forbidden { .. } => "forbidden",
            AppError::Throttled { .. } => "throttled",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict { .. } => "conflict",
            AppError::Dependency { .. } => "dependency_error",
            AppError::Internal { .. } => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Dependency { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the client-visible payload, hiding dependency and internal detail.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::Forbidden { message, details }
            | AppError::NotFound { message, details }
            | AppError::Conflict { message, details } => (message.clone(), details.clone()),
            AppError::Unauthorized { reason } => (
                "Unauthorized".to_string(),
                json!({ "reason": reason.kind() }),
            ),
            AppError::Throttled { retry_after } => (
                "Too many requests".to_string(),
                json!({ "retry_after_seconds": retry_after_seconds(*retry_after) }),
            ),
            AppError::Dependency { .. } => (
                "A required service is temporarily unavailable".to_string(),
                json!({}),
            ),
            AppError::Internal { .. } => ("Internal server error".to_string(), json!({})),
        };

        ErrorInfo {
            code: self.code(),
            message,
            details,
            correlation_id: current_correlation_id(),
        }
    }
}

/// Whole seconds for a `Retry-After` header, never below one.
pub fn retry_after_seconds(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Dependency { detail } => {
                tracing::error!(
                    correlation_id = current_correlation_id().as_deref(),
                    detail,
                    "dependency failure"
                );
            }
            AppError::Internal { detail } => {
                tracing::error!(
                    correlation_id = current_correlation_id().as_deref(),
                    detail,
                    "internal error"
                );
            }
            _ => {}
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };
        let mut response = (status, Json(body)).into_response();

        match &self {
            AppError::Unauthorized { reason } => {
                let challenge = format!(
                    "Bearer error=\"invalid_token\", error_description=\"{}\"",
                    reason.kind()
                );
                if let Ok(value) = HeaderValue::from_str(&challenge) {
                    response
                        .headers_mut()
                        .insert(header::WWW_AUTHENTICATE, value);
                }
            }
            AppError::Throttled { retry_after } => {
                response.headers_mut().insert(
                    header::RETRY_AFTER,
                    HeaderValue::from(retry_after_seconds(*retry_after)),
                );
            }
            _ => {}
        }

        response
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::dependency(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::bad_request("x", json!({})).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::unauthorized(AuthError::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::throttled(Duration::from_secs(3)).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::dependency("redis down").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_dependency_detail_is_hidden() {
        let info = AppError::dependency("connection refused at 10.0.0.3:6379").to_error_info();
        assert_eq!(info.code, "dependency_error");
        assert!(!info.message.contains("10.0.0.3"));
        assert_eq!(info.details, json!({}));
    }

    #[test]
    fn test_auth_reason_in_details() {
        let info = AppError::unauthorized(AuthError::Expired).to_error_info();
        assert_eq!(info.code, "auth_error");
        assert_eq!(info.details["reason"], "expired");
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_seconds(Duration::from_millis(1500)), 2);
        assert_eq!(retry_after_seconds(Duration::from_secs(4)), 4);
        assert_eq!(retry_after_seconds(Duration::ZERO), 1);
    }

    #[test]
    fn test_throttled_response_has_retry_after() {
        let response = AppError::throttled(Duration::from_secs(42)).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[test]
    fn test_unauthorized_response_has_challenge() {
        let response = AppError::unauthorized(AuthError::SignatureInvalid).into_response();
        let challenge = response.headers()[header::WWW_AUTHENTICATE].to_str().unwrap();
        assert!(challenge.starts_with("Bearer"));
        assert!(challenge.contains("signature_invalid"));
    }
}
