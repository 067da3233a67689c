//! Bearer token validation and issuance.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims carried by bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Authenticated caller, attached to a single request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub roles: BTreeSet<String>,
    pub expires_at: DateTime<Utc>,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// True when `required` is empty or the principal holds at least one of them.
    pub fn has_any_role(&self, required: &[&str]) -> bool {
        required.is_empty() || required.iter().any(|r| self.has_role(r))
    }
}

/// Why a credential was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("credential is missing")]
    Missing,

    #[error("credential cannot be parsed")]
    Malformed,

    #[error("credential has expired")]
    Expired,

    #[error("credential signature does not verify")]
    SignatureInvalid,

    #[error("credential claims are not acceptable: {0}")]
    InvalidClaims(String),
}

impl AuthError {
    /// Stable identifier reported to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Missing => "missing",
            AuthError::Malformed => "malformed",
            AuthError::Expired => "expired",
            AuthError::SignatureInvalid => "signature_invalid",
            AuthError::InvalidClaims(_) => "invalid_claims",
        }
    }
}

/// Verifies and issues HS256 bearer tokens.
///
/// Holds only immutable key material, so a single instance is shared by all
/// requests without synchronisation.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
    issuer: Option<String>,
}

impl TokenValidator {
    /// Creates a validator.
    ///
    /// # Arguments
    ///
    /// - `signing_secret` - HMAC key shared with the token issuer
    /// - `issuer` - when set, tokens must carry a matching `iss` claim
    /// - `leeway_seconds` - tolerated clock skew when checking `exp`
    pub fn new(signing_secret: &str, issuer: Option<String>, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(ref iss) = issuer {
            validation.set_issuer(&[iss]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(signing_secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(signing_secret.as_bytes()),
            validation,
            issuer,
        }
    }

    /// Validates a raw token and builds the [`Principal`] from its claims.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Malformed`] if the token cannot be parsed
    /// - [`AuthError::Expired`] if `exp` is in the past (beyond the leeway)
    /// - [`AuthError::SignatureInvalid`] if the signature does not verify
    /// - [`AuthError::InvalidClaims`] if required claims are missing or the
    ///   issuer does not match
    pub fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?;

        let claims = data.claims;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(AuthError::Malformed)?;

        Ok(Principal {
            subject: claims.sub,
            roles: claims.roles.into_iter().collect(),
            expires_at,
        })
    }

    /// Issues a signed token for `subject` valid for `lifetime`.
    pub fn issue(
        &self,
        subject: &str,
        roles: &[String],
        lifetime: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            roles: roles.to_vec(),
            exp: now + lifetime.as_secs() as i64,
            iat: Some(now),
            iss: self.issuer.clone(),
        };

        self.sign(&claims)
    }

    /// Signs arbitrary claims with the configured key.
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidClaims(e.to_string()))
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::SignatureInvalid,
        ErrorKind::InvalidIssuer => AuthError::InvalidClaims("issuer".to_string()),
        ErrorKind::ImmatureSignature => AuthError::InvalidClaims("nbf".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => AuthError::InvalidClaims(claim.clone()),
        _ => AuthError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    const SECRET: &str = "test-signing-secret";

    fn validator() -> TokenValidator {
        TokenValidator::new(SECRET, None, 0)
    }

    fn claims(exp_offset_secs: i64) -> Claims {
        Claims {
            sub: "user-123".to_string(),
            roles: vec!["User".to_string()],
            exp: Utc::now().timestamp() + exp_offset_secs,
            iat: None,
            iss: None,
        }
    }

    #[test]
    fn test_issued_token_round_trips() {
        let v = validator();
        let token = v
            .issue(
                "alice",
                &["Administrator".to_string()],
                Duration::from_secs(600),
            )
            .unwrap();

        let principal = v.validate(&token).unwrap();
        assert_eq!(principal.subject, "alice");
        assert!(principal.has_role("Administrator"));
        assert!(principal.expires_at > Utc::now());
    }

    #[test]
    fn test_expired_token() {
        let v = validator();
        let token = v.sign(&claims(-3600)).unwrap();
        assert_eq!(v.validate(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_leeway_tolerates_recent_expiry() {
        let v = TokenValidator::new(SECRET, None, 120);
        let token = v.sign(&claims(-30)).unwrap();
        assert!(v.validate(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret() {
        let token = TokenValidator::new("other-secret", None, 0)
            .sign(&claims(600))
            .unwrap();
        assert_eq!(validator().validate(&token), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn test_malformed_token() {
        assert_eq!(validator().validate("not-a-jwt"), Err(AuthError::Malformed));
        assert_eq!(validator().validate(""), Err(AuthError::Malformed));
    }

    #[test]
    fn test_any_flipped_signature_byte_fails() {
        let v = validator();
        let token = v.sign(&claims(600)).unwrap();
        let (head, signature) = token.rsplit_once('.').unwrap();
        let raw = URL_SAFE_NO_PAD.decode(signature).unwrap();

        for i in 0..raw.len() {
            let mut tampered = raw.clone();
            tampered[i] ^= 0x01;
            let forged = format!("{}.{}", head, URL_SAFE_NO_PAD.encode(&tampered));
            assert_eq!(v.validate(&forged), Err(AuthError::SignatureInvalid));
        }
    }

    #[test]
    fn test_issuer_is_enforced() {
        let strict = TokenValidator::new(SECRET, Some("hotel-listing".to_string()), 0);
        let foreign = validator().sign(&claims(600)).unwrap();
        assert!(matches!(
            strict.validate(&foreign),
            Err(AuthError::InvalidClaims(_))
        ));

        let own = strict.issue("bob", &[], Duration::from_secs(60)).unwrap();
        assert!(strict.validate(&own).is_ok());
    }

    #[test]
    fn test_has_any_role() {
        let v = validator();
        let token = v.issue("carol", &["User".to_string()], Duration::from_secs(60)).unwrap();
        let principal = v.validate(&token).unwrap();

        assert!(principal.has_any_role(&[]));
        assert!(principal.has_any_role(&["Administrator", "User"]));
        assert!(!principal.has_any_role(&["Administrator"]));
    }
}
