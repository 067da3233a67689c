//! DTO for the authenticated caller's profile.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::Principal;

#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub subject: String,
    pub roles: Vec<String>,
    pub token_expires_at: DateTime<Utc>,
}

impl From<Principal> for ProfileDto {
    fn from(p: Principal) -> Self {
        ProfileDto {
            subject: p.subject,
            roles: p.roles.into_iter().collect(),
            token_expires_at: p.expires_at,
        }
    }
}
