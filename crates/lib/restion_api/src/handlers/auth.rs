//! Authentication request handlers.
//!
//! Handlers stay thin: decode the request shape, delegate to
//! [`crate::services::auth`], wrap the result in the success envelope.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum::{Extension, Json};
use axum_extra::extract::CookieJar;

use restion_core::models::DeviceInfo;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    AuthData, CredentialsRequest, MessageData, RefreshRequest, TokenPairData, UserData,
};
use crate::response::ApiSuccess;
use crate::services::auth;

/// Cookie the web client keeps the refresh secret in.
const REFRESH_COOKIE: &str = "refresh_token";

/// Device metadata from request headers: user agent plus the first
/// `X-Forwarded-For` hop.
fn device_info(headers: &HeaderMap) -> DeviceInfo {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());
    DeviceInfo { user_agent, ip }
}

/// Refresh secret from the JSON body, falling back to the client cookie.
/// An empty value in either place counts as absent.
fn presented_refresh(body: RefreshRequest, jar: &CookieJar) -> Option<String> {
    body.refresh_token.filter(|t| !t.is_empty()).or_else(|| {
        jar.get(REFRESH_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// `POST /api/auth/register` — create an account and issue a first session.
pub async fn register_handler(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiSuccess<AuthData>>)> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let data = auth::register(&state, body.email, body.password).await?;
    Ok((StatusCode::CREATED, ApiSuccess::new("User registered", data)))
}

/// `POST /api/auth/login` — authenticate and issue a session.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<ApiSuccess<AuthData>>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let data = auth::login(&state, body.email, body.password, device_info(&headers)).await?;
    Ok(ApiSuccess::new("Login successful", data))
}

/// `POST /api/auth/refresh` — rotate a refresh secret into a fresh pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<ApiSuccess<TokenPairData>>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let presented = presented_refresh(body, &jar)
        .ok_or_else(|| AppError::NoToken("No refresh token provided".into()))?;

    let data = auth::refresh_tokens(&state, &presented, device_info(&headers)).await?;
    Ok(ApiSuccess::new("Tokens refreshed", data))
}

/// `POST /api/auth/logout` — revoke the calling session.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    jar: CookieJar,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<ApiSuccess<MessageData>>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let presented = presented_refresh(body, &jar);

    auth::logout(&state, &auth_user.claims, presented.as_deref()).await?;
    Ok(ApiSuccess::new(
        "Logged out successfully",
        MessageData {
            message: "You have been logged out".into(),
        },
    ))
}

/// `POST /api/auth/logout-all` — revoke every session of the calling user.
pub async fn logout_all_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiSuccess<MessageData>>> {
    auth::logout_all(&state, &auth_user.claims).await?;
    Ok(ApiSuccess::new(
        "Logged out from all devices",
        MessageData {
            message: "You have been logged out from all devices".into(),
        },
    ))
}

/// `GET /api/auth/me` — the calling user's profile.
pub async fn me_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiSuccess<UserData>>> {
    Ok(ApiSuccess::data(UserData {
        user: auth_user.user,
    }))
}
