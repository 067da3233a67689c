//! Handler for the caller's own profile.

use axum::{Extension, Json};

use crate::api::dto::profile::ProfileDto;
use crate::application::services::Principal;

/// Returns the authenticated caller's subject and roles.
///
/// # Endpoint
///
/// `GET /api/v1/account/profile` (any authenticated caller)
///
/// The principal is attached by the pipeline; responses are cached per subject.
pub async fn profile_handler(Extension(principal): Extension<Principal>) -> Json<ProfileDto> {
    Json(principal.into())
}
