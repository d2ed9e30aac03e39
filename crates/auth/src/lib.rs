//! `eventhub-auth`: authentication boundary.
//!
//! Token claims, HS256 signing/verification, password hashing and the
//! credential model. Decoupled from HTTP and storage.

pub mod claims;
pub mod jwt;
pub mod password;
pub mod roles;
pub mod user;

pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{authenticate, AuthError, Hs256JwtIssuer, Hs256JwtValidator, JwtIssuer, JwtValidator, TokenIssueError};
pub use password::{hash_password, verify_password, HashedPassword, PasswordHashError};
pub use roles::Role;
pub use user::{Credentials, NewUser, User, MIN_PASSWORD_LEN};
