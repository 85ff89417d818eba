//! Signed-token codec: mint and verify JWT access tokens.
//!
//! Access tokens are self-contained HS256 JWTs carrying
//! `(sub, type, jti, iat, exp)`. Refresh tokens deliberately do NOT pass
//! through this codec — they are opaque random secrets that reveal nothing
//! without a ledger lookup (see [`super::refresh`]).

use std::path::PathBuf;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use thiserror::Error;
use tracing::info;

use crate::models::{TokenClaims, TokenKind};

/// Outcome of a failed mint or verify, as a closed set of kinds.
///
/// Call sites switch on these variants; none of them carries the underlying
/// library error, so a token failure can never be told apart by message
/// inspection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token encoding failed")]
    Encoding,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Malformed,

    #[error("Invalid token type")]
    WrongKind,
}

/// Mint a signed token for `user_id` with the given kind, unique ID, and
/// lifetime. `exp` is computed as `iat + ttl_secs`.
pub fn generate_token(
    user_id: i64,
    kind: TokenKind,
    jti: &str,
    ttl_secs: i64,
    secret: &[u8],
) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id,
        kind,
        jti: jti.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|_| TokenError::Encoding)
}

/// Verify an access token: signature and structure, then expiry, then kind.
///
/// Expiry is exact — a token whose `exp` equals the current second is
/// already expired, so a TTL of zero never yields a usable token. The
/// jsonwebtoken leeway is bypassed for the same reason.
pub fn verify_access_token(token: &str, secret: &[u8]) -> Result<TokenClaims, TokenError> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = false; // expiry checked below, without leeway
    let claims = decode::<TokenClaims>(token, &key, &validation)
        .map_err(|_| TokenError::Malformed)?
        .claims;

    if claims.exp <= Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }
    if claims.kind != TokenKind::Access {
        return Err(TokenError::WrongKind);
    }
    Ok(claims)
}

/// Resolve the JWT secret: env var `JWT_SECRET` → `AUTH_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    if let Ok(secret) = std::env::var("AUTH_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    // Generate and persist
    let secret_path = jwt_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), "generated new JWT secret");
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("restion")
        .join("jwt-secret")
}
