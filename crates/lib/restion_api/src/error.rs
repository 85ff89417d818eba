//! Application error types.
//!
//! Every failure leaving the API is one [`AppError`] variant, rendered as the
//! failure envelope `{"success": false, "error": {"code", "message"}}` with
//! the variant's fixed HTTP status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use restion_core::auth::AuthError;
use restion_core::auth::jwt::TokenError;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status and error-code mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    MissingFields(String),

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    NoToken(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found or inactive")]
    UserNotFound,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Failure envelope body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The cause goes to the log; clients only ever see the fixed message.
        if let AppError::Internal(cause) = &self {
            error!(%cause, "internal server error");
        }
        let (status, code, message) = match &self {
            AppError::MissingFields(m) => (StatusCode::BAD_REQUEST, "MISSING_FIELDS", m.as_str()),
            AppError::EmailAlreadyRegistered => (
                StatusCode::CONFLICT,
                "EMAIL_ALREADY_REGISTERED",
                "Email already registered",
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password",
            ),
            AppError::NoToken(m) => (StatusCode::UNAUTHORIZED, "NO_TOKEN", m.as_str()),
            AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", "Token has expired")
            }
            AppError::TokenRevoked => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_REVOKED",
                "Token has been revoked",
            ),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", "Invalid token"),
            AppError::UserNotFound => (
                StatusCode::UNAUTHORIZED,
                "USER_NOT_FOUND",
                "User not found or inactive",
            ),
            AppError::InvalidRefreshToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_REFRESH_TOKEN",
                "Invalid or expired refresh token",
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "Internal server error",
            ),
        };
        let body = Json(ErrorBody {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
            },
        });
        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidRefreshToken => AppError::InvalidRefreshToken,
            AuthError::DuplicateEmail => AppError::EmailAlreadyRegistered,
            AuthError::Token(e) => AppError::from(e),
            AuthError::Db(e) => AppError::Internal(e.to_string()),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Malformed | TokenError::WrongKind => AppError::InvalidToken,
            TokenError::Encoding => AppError::Internal("token encoding failed".into()),
        }
    }
}
