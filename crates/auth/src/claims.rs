use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use eventhub_core::UserId;

use crate::jwt::TokenIssueError;
use crate::{Role, User};

/// JWT claims model (transport-agnostic).
///
/// The minimal set of claims the service expects once a token has been
/// decoded and its signature verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the authenticated user.
    pub sub: UserId,

    pub email: String,

    pub role: Role,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl JwtClaims {
    /// Claims for `user`, valid from `now` for `ttl`.
    pub fn for_user(
        user: &User,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenIssueError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(TokenIssueError::ExpiryOverflow(ttl))?;
        Ok(Self {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            issued_at: now,
            expires_at,
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    /// Decoding or signature verification failed.
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Deterministically validate JWT claims.
///
/// Validates the claim time window only. Signature verification happens in
/// the `jwt` module before this is called.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(issued_at: DateTime<Utc>, ttl_minutes: i64) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(1),
            email: "alice@example.com".to_string(),
            role: Role::User,
            issued_at,
            expires_at: issued_at + Duration::minutes(ttl_minutes),
        }
    }

    fn user() -> User {
        User {
            id: UserId::new(7),
            email: "bob@example.com".to_string(),
            password_hash: crate::hash_password("secret123").unwrap(),
            role: Role::User,
        }
    }

    #[test]
    fn for_user_sets_expiry_from_ttl() {
        let now = Utc::now();
        let claims = JwtClaims::for_user(&user(), now, Duration::minutes(30)).unwrap();
        assert_eq!(claims.sub, UserId::new(7));
        assert_eq!(claims.expires_at, now + Duration::minutes(30));
    }

    #[test]
    fn for_user_rejects_lifetime_past_the_calendar() {
        let ttl = Duration::MAX;
        let err = JwtClaims::for_user(&user(), Utc::now(), ttl).unwrap_err();
        assert!(matches!(err, TokenIssueError::ExpiryOverflow(d) if d == ttl));
    }

    #[test]
    fn accepts_claims_inside_window() {
        let now = Utc::now();
        assert!(validate_claims(&claims(now, 120), now + Duration::minutes(1)).is_ok());
    }

    #[test]
    fn rejects_expired_claims() {
        let now = Utc::now();
        let result = validate_claims(&claims(now, 120), now + Duration::minutes(120));
        assert_eq!(result, Err(TokenValidationError::Expired));
    }

    #[test]
    fn rejects_future_claims() {
        let now = Utc::now();
        let result = validate_claims(&claims(now + Duration::minutes(5), 10), now);
        assert_eq!(result, Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let result = validate_claims(&claims(now, -1), now);
        assert_eq!(result, Err(TokenValidationError::InvalidTimeWindow));
    }
}
