//! Storage backends for users, refresh tokens, and the access-token denylist.
//!
//! The auth flows only ever talk to these traits. [`PgStore`] is the
//! production backend; [`MemoryStore`] backs tests and local development
//! without a database.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::auth::AuthError;
use crate::models::{DeviceInfo, RefreshTokenRecord, User, UserWithPassword};

/// User account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. Fails with [`AuthError::DuplicateEmail`] when the email
    /// is already registered.
    async fn create(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User, AuthError>;

    /// Look up a user by exact email match, including the password hash.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, AuthError>;

    /// Look up a user by ID. Returns `None` if the account no longer exists.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError>;
}

/// Refresh-token ledger storage. Rows are keyed by the SHA-256 hash of the
/// secret; the plaintext never reaches this layer.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Record a freshly issued token hash.
    async fn insert(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
        device_info: Option<&DeviceInfo>,
    ) -> Result<(), AuthError>;

    /// Find a non-revoked, non-expired row by hash.
    async fn find_usable(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AuthError>;

    /// Revoke a row if it is not revoked yet. Returns `true` only for the
    /// call that flipped the row; concurrent callers racing on the same hash
    /// see `true` exactly once.
    async fn revoke(&self, token_hash: &str) -> Result<bool, AuthError>;

    /// Revoke every live token belonging to `user_id`. Returns the number of
    /// rows flipped.
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AuthError>;

    /// Delete rows past their expiry.
    async fn delete_expired(&self) -> Result<u64, AuthError>;

    /// Delete revoked rows past their expiry. Revoked rows that have not
    /// expired yet stay behind so replay attempts keep failing loudly.
    async fn delete_revoked_expired(&self) -> Result<u64, AuthError>;

    /// Delete expired rows belonging to a single user.
    async fn delete_expired_for_user(&self, user_id: i64) -> Result<u64, AuthError>;

    async fn count_all(&self) -> Result<i64, AuthError>;
    async fn count_expired(&self) -> Result<i64, AuthError>;
    async fn count_revoked(&self) -> Result<i64, AuthError>;
}

/// Access-token denylist storage, keyed by the token's `jti`.
#[async_trait]
pub trait RevokedTokenStore: Send + Sync {
    /// Record a `jti` in the denylist until `expires_at`. Registering the
    /// same `jti` again is a no-op.
    async fn revoke(
        &self,
        jti: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    /// Presence probe: `true` while any row for `jti` exists, whether or not
    /// it has expired. Expired rows only disappear when swept.
    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError>;

    /// Delete rows past the matching access token's expiry.
    async fn delete_expired(&self) -> Result<u64, AuthError>;

    async fn count_all(&self) -> Result<i64, AuthError>;
    async fn count_expired(&self) -> Result<i64, AuthError>;
}
