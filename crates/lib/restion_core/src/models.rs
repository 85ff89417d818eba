//! Authentication domain models.
//!
//! `User` is the public shape returned to clients; `UserWithPassword` exists
//! only for the login path and never crosses the API boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain user, without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Minutes of rest earned per focus interval.
    pub rest_ratio: i32,
    /// Minutes between focus reminders.
    pub reminder_interval: i32,
}

/// User with password hash (for internal auth flows).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserWithPassword {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Discriminator embedded in every signed token.
///
/// The access-verification path rejects any token whose kind is not
/// `Access`, even with a valid signature, so the two token namespaces can
/// never be confused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject — user ID (standard JWT `sub` claim).
    pub sub: i64,
    /// Token kind discriminator (serialized as `type`).
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Unique token ID, the revocation key.
    pub jti: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// Device metadata recorded alongside a refresh token for audit purposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

/// Refresh token record stored in the database.
///
/// Usable iff `revoked_at` is `None` and `expires_at` is in the future.
/// Only the SHA-256 hash of the opaque secret is kept; the secret itself is
/// returned to the client once and never retrievable again.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub device_info: Option<serde_json::Value>,
}

/// Denylist entry for an access token revoked before its natural expiry.
///
/// `expires_at` is the token's own expiry, so the row can be purged as soon
/// as the token would have died anyway.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RevokedTokenRecord {
    pub id: i64,
    pub jti: String,
    pub user_id: i64,
    pub revoked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
