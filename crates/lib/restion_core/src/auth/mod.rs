//! Authentication and token lifecycle logic.
//!
//! Provides password hashing, the signed-token codec, and opaque
//! refresh-token handling, shared by `restion_api` and the server binary.

pub mod jwt;
pub mod password;
pub mod refresh;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Uniform error for every refresh-token miss: absent, revoked, or
    /// expired all look identical, so the error never reveals whether a
    /// presented secret was ever valid.
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error(transparent)]
    Token(#[from] jwt::TokenError),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
