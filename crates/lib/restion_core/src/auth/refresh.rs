//! Refresh-token ledger: opaque single-use secrets backing session renewal.
//!
//! Secrets are random 64-char alphanumeric strings. Only the SHA-256 hash is
//! ever stored, so a leaked ledger cannot be replayed. Rotation and revocation
//! happen through conditional store writes (see [`crate::store`]); this module
//! owns the secret format and the lookup semantics.

use chrono::{Duration, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};

use super::AuthError;
use crate::models::DeviceInfo;
use crate::store::RefreshTokenStore;

/// Refresh token lifetime: 7 days.
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Generate a cryptographically random refresh secret (64 alphanumeric chars).
pub fn generate_refresh_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// SHA-256 hash a refresh secret for storage.
pub fn hash_refresh_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A presented secret that matched a live ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRefreshToken {
    pub user_id: i64,
    pub token_hash: String,
}

/// Issue a fresh refresh token for `user_id`: mint the secret, store its
/// hash with a 7-day expiry, return the plaintext secret.
///
/// The plaintext never touches storage; this return value is the only copy.
pub async fn issue(
    store: &dyn RefreshTokenStore,
    user_id: i64,
    device_info: Option<&DeviceInfo>,
) -> Result<String, AuthError> {
    let secret = generate_refresh_secret();
    let token_hash = hash_refresh_secret(&secret);
    let expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS);
    store
        .insert(user_id, &token_hash, expires_at, device_info)
        .await?;
    Ok(secret)
}

/// Resolve a presented secret to its live ledger row.
///
/// Unknown, expired and revoked secrets all fail the same way; the caller
/// cannot tell which case it hit.
pub async fn resolve(
    store: &dyn RefreshTokenStore,
    secret: &str,
) -> Result<ResolvedRefreshToken, AuthError> {
    let token_hash = hash_refresh_secret(secret);
    match store.find_usable(&token_hash).await? {
        Some(record) => Ok(ResolvedRefreshToken {
            user_id: record.user_id,
            token_hash,
        }),
        None => Err(AuthError::InvalidRefreshToken),
    }
}
