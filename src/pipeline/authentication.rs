//! Bearer credential extraction and route authorization.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum_auth::AuthBearer;
use serde_json::json;

use super::version_router::Access;
use crate::application::services::{AuthError, Principal, TokenValidator};
use crate::error::AppError;

pub struct Authenticator {
    tokens: Arc<TokenValidator>,
}

impl Authenticator {
    pub fn new(tokens: Arc<TokenValidator>) -> Self {
        Self { tokens }
    }

    /// Validates the `Authorization: Bearer` credential, if one was sent.
    ///
    /// Returns `None` without the header. Validation has no side effects, so
    /// the result is computed once and reused for identity and authorization.
    pub async fn credential(&self, parts: &mut Parts) -> Option<Result<Principal, AuthError>> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return None;
        }

        let result = match AuthBearer::from_request_parts(parts, &()).await {
            Ok(AuthBearer(token)) => self.tokens.validate(token.trim()),
            Err(_) => Err(AuthError::Malformed),
        };
        Some(result)
    }
}

/// Applies a route's [`Access`] rule to the request credential.
///
/// Public routes pass through any valid principal and ignore bad credentials.
/// Protected routes fail closed: a missing or invalid credential is `401`,
/// a principal without a required role is `403`.
pub fn authorize(
    access: &Access,
    credential: Option<Result<Principal, AuthError>>,
) -> Result<Option<Principal>, AppError> {
    match access {
        Access::Public => Ok(credential.and_then(Result::ok)),
        Access::Protected(roles) => {
            let principal = credential
                .unwrap_or(Err(AuthError::Missing))
                .map_err(AppError::unauthorized)?;

            if !principal.has_any_role(roles) {
                return Err(AppError::forbidden(
                    "Insufficient role for this operation",
                    json!({ "required_roles": roles }),
                ));
            }

            Ok(Some(principal))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};
    use std::time::Duration;

    fn tokens() -> Arc<TokenValidator> {
        Arc::new(TokenValidator::new("secret", None, 0))
    }

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/account/profile");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_no_header_is_no_credential() {
        let auth = Authenticator::new(tokens());
        assert!(auth.credential(&mut parts(None)).await.is_none());
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_malformed() {
        let auth = Authenticator::new(tokens());
        let result = auth.credential(&mut parts(Some("Basic dXNlcjpwYXNz"))).await;
        assert_eq!(result, Some(Err(AuthError::Malformed)));
    }

    #[tokio::test]
    async fn test_valid_bearer() {
        let tokens = tokens();
        let token = tokens.issue("alice", &[], Duration::from_secs(60)).unwrap();
        let auth = Authenticator::new(tokens);

        let principal = auth
            .credential(&mut parts(Some(&format!("Bearer {}", token))))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(principal.subject, "alice");
    }

    #[test]
    fn test_protected_route_without_credential() {
        let err = authorize(&Access::Protected(vec![]), None).unwrap_err();
        assert!(matches!(
            err,
            AppError::Unauthorized {
                reason: AuthError::Missing
            }
        ));
    }

    #[test]
    fn test_public_route_ignores_bad_credential() {
        let result = authorize(&Access::Public, Some(Err(AuthError::Expired))).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_missing_role_is_forbidden() {
        let tokens = tokens();
        let token = tokens
            .issue("bob", &["User".to_string()], Duration::from_secs(60))
            .unwrap();
        let principal = tokens.validate(&token);

        let err = authorize(&Access::Protected(vec!["Administrator"]), Some(principal)).unwrap_err();
        assert!(matches!(err, AppError::Forbidden { .. }));
    }
}
