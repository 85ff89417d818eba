//! Request and response bodies for the auth endpoints.

use serde::{Deserialize, Serialize};

use restion_core::models::User;

/// `POST /api/auth/register` and `POST /api/auth/login` body.
///
/// Fields stay optional so an absent field surfaces as the API's own
/// missing-fields error rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `POST /api/auth/refresh` and `POST /api/auth/logout` body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Token pair plus the owning user, returned by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Fresh token pair returned by refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairData {
    pub access_token: String,
    pub refresh_token: String,
}

/// Informational payload on the logout responses.
#[derive(Debug, Serialize)]
pub struct MessageData {
    pub message: String,
}

/// `GET /api/auth/me` payload.
#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: User,
}
