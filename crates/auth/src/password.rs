//! Password hashing (argon2id, PHC string format).

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A password hash in PHC string format. Never contains the plaintext.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wrap a PHC string loaded from storage.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(String);

pub fn hash_password(plaintext: &str) -> Result<HashedPassword, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| PasswordHashError(e.to_string()))?;
    Ok(HashedPassword(hash.to_string()))
}

/// Check `plaintext` against `hashed`. A malformed stored hash never verifies.
pub fn verify_password(plaintext: &str, hashed: &HashedPassword) -> bool {
    let Ok(parsed) = PasswordHash::new(hashed.as_str()) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_original_password() {
        let hashed = hash_password("secret123").unwrap();
        assert_ne!(hashed.as_str(), "secret123");
        assert!(hashed.as_str().starts_with("$argon2id$"));
        assert!(verify_password("secret123", &hashed));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hashed = hash_password("secret123").unwrap();
        assert!(!verify_password("secret124", &hashed));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", &HashedPassword::from_phc("not-a-phc-string")));
    }

    #[test]
    fn debug_output_hides_hash() {
        let hashed = hash_password("secret123").unwrap();
        assert_eq!(format!("{hashed:?}"), "HashedPassword(..)");
    }
}
