//! # restion_api
//!
//! HTTP API library for Restion.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod response;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use restion_core::store::{RefreshTokenStore, RevokedTokenStore, UserStore};

use crate::config::ApiConfig;
use crate::handlers::{auth, hello};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// User account storage.
    pub users: Arc<dyn UserStore>,
    /// Refresh-token ledger storage.
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    /// Access-token denylist storage.
    pub revoked_tokens: Arc<dyn RevokedTokenStore>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Builds state from one storage backend implementing all three store
    /// traits (`PgStore` in production, `MemoryStore` in tests).
    pub fn new<S>(store: Arc<S>, config: ApiConfig) -> Self
    where
        S: UserStore + RefreshTokenStore + RevokedTokenStore + 'static,
    {
        Self {
            users: store.clone(),
            refresh_tokens: store.clone(),
            revoked_tokens: store,
            config,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `restion_core::migrate::migrate()` which owns the migration
/// files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    restion_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/", get(hello::hello_world))
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/refresh", post(auth::refresh_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/api/auth/logout", post(auth::logout_handler))
        .route("/api/auth/logout-all", post(auth::logout_all_handler))
        .route("/api/auth/me", get(auth::me_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
