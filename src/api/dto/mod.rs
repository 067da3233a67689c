//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation.

pub mod country;
pub mod health;
pub mod hotel;
pub mod pagination;
pub mod profile;

use serde::de::DeserializeOwned;
use serde_json::json;
use validator::Validate;

use crate::error::AppError;

/// Parses a JSON body as `T` and runs its validation rules.
///
/// Registered per route and run by the pipeline before the handler is
/// called, so handlers only ever see well-formed input.
pub fn validate_json<T>(body: &[u8]) -> Result<(), AppError>
where
    T: DeserializeOwned + Validate,
{
    let payload: T = serde_json::from_slice(body).map_err(|e| {
        AppError::bad_request("Request body is not valid JSON", json!({ "reason": e.to_string() }))
    })?;
    payload.validate()?;
    Ok(())
}
