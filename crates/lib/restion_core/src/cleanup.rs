//! Periodic deletion of dead token rows.
//!
//! Three sweeps run on each pass: expired denylist entries, expired refresh
//! tokens, and revoked refresh tokens past their expiry. Revoked rows that
//! have not expired yet are deliberately kept so replayed secrets keep
//! hitting a dead row instead of a missing one.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::auth::AuthError;
use crate::store::{RefreshTokenStore, RevokedTokenStore};

/// Default sweep interval: 1 hour.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Row counts across both token tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStats {
    pub total_refresh_tokens: i64,
    pub expired_refresh_tokens: i64,
    pub revoked_refresh_tokens: i64,
    pub total_revoked_access_tokens: i64,
    pub expired_revoked_access_tokens: i64,
}

/// Run one cleanup pass. Each sweep is independent: a failing sweep is
/// logged and the remaining sweeps still run.
pub async fn run_cleanup(refresh: &dyn RefreshTokenStore, revoked: &dyn RevokedTokenStore) {
    debug!("running token cleanup");

    match revoked.delete_expired().await {
        Ok(count) if count > 0 => debug!(deleted = count, "expired denylist entries deleted"),
        Err(e) => error!(error = %e, "failed to delete expired denylist entries"),
        _ => {}
    }

    match refresh.delete_expired().await {
        Ok(count) if count > 0 => debug!(deleted = count, "expired refresh tokens deleted"),
        Err(e) => error!(error = %e, "failed to delete expired refresh tokens"),
        _ => {}
    }

    match refresh.delete_revoked_expired().await {
        Ok(count) if count > 0 => {
            debug!(deleted = count, "revoked refresh tokens past expiry deleted")
        }
        Err(e) => error!(error = %e, "failed to delete revoked refresh tokens"),
        _ => {}
    }
}

/// Start the periodic cleanup task. The first pass runs one full interval
/// after startup.
pub fn start_cleanup_scheduler(
    refresh: Arc<dyn RefreshTokenStore>,
    revoked: Arc<dyn RevokedTokenStore>,
    interval: Duration,
) -> JoinHandle<()> {
    info!(
        interval_secs = interval.as_secs(),
        "token cleanup scheduler started"
    );
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        // interval's first tick completes immediately
        timer.tick().await;
        loop {
            timer.tick().await;
            run_cleanup(refresh.as_ref(), revoked.as_ref()).await;
        }
    })
}

/// Delete a single user's expired refresh tokens.
pub async fn cleanup_user_expired_tokens(
    refresh: &dyn RefreshTokenStore,
    user_id: i64,
) -> Result<u64, AuthError> {
    let deleted = refresh.delete_expired_for_user(user_id).await?;
    if deleted > 0 {
        debug!(user_id, deleted, "expired refresh tokens deleted for user");
    }
    Ok(deleted)
}

/// Snapshot row counts for both token tables.
pub async fn token_stats(
    refresh: &dyn RefreshTokenStore,
    revoked: &dyn RevokedTokenStore,
) -> Result<TokenStats, AuthError> {
    Ok(TokenStats {
        total_refresh_tokens: refresh.count_all().await?,
        expired_refresh_tokens: refresh.count_expired().await?,
        revoked_refresh_tokens: refresh.count_revoked().await?,
        total_revoked_access_tokens: revoked.count_all().await?,
        expired_revoked_access_tokens: revoked.count_expired().await?,
    })
}
