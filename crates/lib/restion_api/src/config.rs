//! API configuration.

use restion_core::auth::jwt::resolve_jwt_secret;

/// Configuration shared by all handlers.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
}

impl ApiConfig {
    /// Reads configuration from the environment.
    ///
    /// The JWT secret comes from `JWT_SECRET`, then `AUTH_SECRET`, then a
    /// secret generated once and persisted under the platform data directory,
    /// so access tokens survive restarts.
    pub fn from_env() -> Self {
        Self {
            jwt_secret: resolve_jwt_secret(),
        }
    }
}
