//! Authentication service — session issuance, rotation, and teardown.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use restion_core::auth::{jwt, password, refresh};
use restion_core::models::{DeviceInfo, TokenClaims, TokenKind};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{AuthData, TokenPairData};

/// Access token lifetime: 15 minutes.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 15 * 60;

/// Mint an access/refresh pair for `user_id`.
///
/// The two writes are not transactional; each side fails closed on its own.
async fn issue_tokens(
    state: &AppState,
    user_id: i64,
    device_info: Option<&DeviceInfo>,
) -> AppResult<(String, String)> {
    let jti = Uuid::new_v4().to_string();
    let access_token = jwt::generate_token(
        user_id,
        TokenKind::Access,
        &jti,
        ACCESS_TOKEN_EXPIRY_SECS,
        state.config.jwt_secret.as_bytes(),
    )?;
    let refresh_token = refresh::issue(state.refresh_tokens.as_ref(), user_id, device_info).await?;
    Ok((access_token, refresh_token))
}

/// Register an access token's jti in the denylist until the token's own
/// expiry.
async fn revoke_access_token(state: &AppState, claims: &TokenClaims) -> AppResult<()> {
    // exp outside chrono's range collapses to immediate expiry
    let expires_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
    state
        .revoked_tokens
        .revoke(&claims.jti, claims.sub, expires_at)
        .await?;
    Ok(())
}

/// Create a new account and issue its first session.
///
/// The username is derived from the email local part.
pub async fn register(
    state: &AppState,
    email: Option<String>,
    password_input: Option<String>,
) -> AppResult<AuthData> {
    let (email, password_input) = match (email, password_input) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => return Err(AppError::MissingFields("Missing required fields".into())),
    };

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::EmailAlreadyRegistered);
    }

    let username = email.split('@').next().unwrap_or(&email).to_string();
    let password_hash = password::hash_password(&password_input)?;
    let user = state.users.create(&email, &username, &password_hash).await?;
    info!(user_id = user.id, "user registered");

    let (access_token, refresh_token) = issue_tokens(state, user.id, None).await?;
    Ok(AuthData {
        user,
        access_token,
        refresh_token,
    })
}

/// Authenticate with email + password and issue a session.
///
/// Unknown email and wrong password fail identically.
pub async fn login(
    state: &AppState,
    email: Option<String>,
    password_input: Option<String>,
    device_info: DeviceInfo,
) -> AppResult<AuthData> {
    let (email, password_input) = match (email, password_input) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => {
            return Err(AppError::MissingFields(
                "Email and password are required".into(),
            ));
        }
    };

    let Some(record) = state.users.find_by_email(&email).await? else {
        return Err(AppError::InvalidCredentials);
    };

    if !password::verify_password(&password_input, &record.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let (access_token, refresh_token) =
        issue_tokens(state, record.user.id, Some(&device_info)).await?;
    Ok(AuthData {
        user: record.user,
        access_token,
        refresh_token,
    })
}

/// Exchange a refresh secret for a fresh pair, revoking the presented secret.
pub async fn refresh_tokens(
    state: &AppState,
    presented: &str,
    device_info: DeviceInfo,
) -> AppResult<TokenPairData> {
    let resolved = refresh::resolve(state.refresh_tokens.as_ref(), presented).await?;

    // Single-use rotation: of N concurrent callers holding the same secret,
    // exactly one wins this conditional write.
    if !state.refresh_tokens.revoke(&resolved.token_hash).await? {
        return Err(AppError::InvalidRefreshToken);
    }

    let (access_token, refresh_token) =
        issue_tokens(state, resolved.user_id, Some(&device_info)).await?;
    Ok(TokenPairData {
        access_token,
        refresh_token,
    })
}

/// Tear down the calling session: denylist the access token's jti and, when a
/// refresh secret was presented, revoke it best-effort.
pub async fn logout(
    state: &AppState,
    claims: &TokenClaims,
    presented_refresh: Option<&str>,
) -> AppResult<()> {
    revoke_access_token(state, claims).await?;

    if let Some(secret) = presented_refresh {
        // An already-dead refresh token never blocks logout.
        match refresh::resolve(state.refresh_tokens.as_ref(), secret).await {
            Ok(resolved) => {
                if let Err(e) = state.refresh_tokens.revoke(&resolved.token_hash).await {
                    debug!(error = %e, "refresh token revoke failed at logout");
                }
            }
            Err(e) => debug!(error = %e, "refresh token already invalid at logout"),
        }
    }
    Ok(())
}

/// Tear down every session of the calling user.
pub async fn logout_all(state: &AppState, claims: &TokenClaims) -> AppResult<()> {
    let revoked = state.refresh_tokens.revoke_all_for_user(claims.sub).await?;
    debug!(user_id = claims.sub, revoked, "revoked all refresh tokens");
    // The calling access token dies with the rest.
    revoke_access_token(state, claims).await?;
    Ok(())
}
