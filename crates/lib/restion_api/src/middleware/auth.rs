//! Authentication middleware — Bearer token extraction, verification, and
//! revocation screening.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use restion_core::auth::jwt::verify_access_token;
use restion_core::models::{TokenClaims, User};

use crate::AppState;
use crate::error::AppError;

/// Verified caller identity, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub claims: TokenClaims,
}

/// axum middleware: extracts `Authorization: Bearer <token>`, verifies the
/// token, rejects denylisted jtis and missing users, and injects
/// [`AuthenticatedUser`] into request extensions.
///
/// Each step is a hard gate. A token that verifies but belongs to a deleted
/// account is rejected the same as a revoked one.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::NoToken("No token provided".into()))?;

    let claims = verify_access_token(token, state.config.jwt_secret.as_bytes())?;

    if state.revoked_tokens.is_revoked(&claims.jti).await? {
        return Err(AppError::TokenRevoked);
    }

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::UserNotFound)?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user, claims });

    Ok(next.run(request).await)
}
