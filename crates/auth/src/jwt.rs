//! HS256 token signing and verification.
//!
//! `jsonwebtoken` handles the encoding and the signature; claim time windows
//! are checked by `validate_claims` so expiry semantics stay in one place.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use eventhub_core::UserId;

use crate::claims::{validate_claims, JwtClaims, TokenValidationError};

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// Signs claims into a bearer token.
pub trait JwtIssuer: Send + Sync {
    fn issue(&self, claims: &JwtClaims) -> Result<String, TokenIssueError>;
}

#[derive(Debug, Error)]
pub enum TokenIssueError {
    #[error("could not sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// `issued_at + ttl` falls outside the representable time range.
    #[error("token lifetime {0} overflows the expiry timestamp")]
    ExpiryOverflow(Duration),
}

/// Authorization gate failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No authorization token provided")]
    MissingToken,

    #[error("Invalid/No authorization token")]
    InvalidToken(#[source] TokenValidationError),
}

pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry lives in our own claim fields (see `validate_claims`).
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenValidationError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

pub struct Hs256JwtIssuer {
    key: EncodingKey,
}

impl Hs256JwtIssuer {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
        }
    }
}

impl JwtIssuer for Hs256JwtIssuer {
    fn issue(&self, claims: &JwtClaims) -> Result<String, TokenIssueError> {
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.key)?)
    }
}

/// Resolve a bearer token to the authenticated user id.
pub fn authenticate(
    validator: &dyn JwtValidator,
    token: &str,
    now: DateTime<Utc>,
) -> Result<UserId, AuthError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    validator
        .validate(token, now)
        .map(|claims| claims.sub)
        .map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AuthError::InvalidToken(e)
        })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::Role;

    const SECRET: &str = "test-secret";

    fn claims_at(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(7),
            email: "bob@example.com".to_string(),
            role: Role::User,
            issued_at: now,
            expires_at: now + Duration::hours(2),
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let now = Utc::now();
        let token = Hs256JwtIssuer::new(SECRET).issue(&claims_at(now)).unwrap();
        let claims = Hs256JwtValidator::new(SECRET).validate(&token, now).unwrap();
        assert_eq!(claims, claims_at(now));
    }

    #[test]
    fn authenticate_resolves_subject() {
        let now = Utc::now();
        let token = Hs256JwtIssuer::new(SECRET).issue(&claims_at(now)).unwrap();
        let validator = Hs256JwtValidator::new(SECRET);
        assert_eq!(authenticate(&validator, &token, now), Ok(UserId::new(7)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let token = Hs256JwtIssuer::new("other-secret").issue(&claims_at(now)).unwrap();
        let result = Hs256JwtValidator::new(SECRET).validate(&token, now);
        assert!(matches!(result, Err(TokenValidationError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let token = Hs256JwtIssuer::new(SECRET).issue(&claims_at(now)).unwrap();
        let result = Hs256JwtValidator::new(SECRET).validate(&token, now + Duration::hours(3));
        assert_eq!(result, Err(TokenValidationError::Expired));
    }

    #[test]
    fn empty_token_is_missing() {
        let validator = Hs256JwtValidator::new(SECRET);
        assert_eq!(authenticate(&validator, "  ", Utc::now()), Err(AuthError::MissingToken));
    }

    #[test]
    fn garbage_token_is_invalid() {
        let validator = Hs256JwtValidator::new(SECRET);
        let result = authenticate(&validator, "not-a-jwt", Utc::now());
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}
