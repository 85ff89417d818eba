//! In-memory storage backend for tests and local development.
//!
//! Mirrors the Postgres semantics, including the conditional revoke
//! transitions: the single mutex serializes writers, so exactly one caller
//! observes a live row and flips it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{RefreshTokenStore, RevokedTokenStore, UserStore};
use crate::auth::AuthError;
use crate::models::{DeviceInfo, RefreshTokenRecord, RevokedTokenRecord, User, UserWithPassword};

#[derive(Debug, Default)]
struct Inner {
    users: Vec<UserWithPassword>,
    refresh_tokens: Vec<RefreshTokenRecord>,
    revoked_tokens: Vec<RevokedTokenRecord>,
    next_user_id: i64,
    next_refresh_id: i64,
    next_revoked_id: i64,
}

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User, AuthError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.user.email == email) {
            return Err(AuthError::DuplicateEmail);
        }
        inner.next_user_id += 1;
        let now = Utc::now();
        // Column defaults from the users migration.
        let user = User {
            id: inner.next_user_id,
            email: email.to_string(),
            username: username.to_string(),
            created_at: now,
            updated_at: now,
            rest_ratio: 5,
            reminder_interval: 25,
        };
        inner.users.push(UserWithPassword {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        });
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, AuthError> {
        let inner = self.lock();
        Ok(inner.users.iter().find(|u| u.user.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let inner = self.lock();
        Ok(inner
            .users
            .iter()
            .find(|u| u.user.id == id)
            .map(|u| u.user.clone()))
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn insert(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
        device_info: Option<&DeviceInfo>,
    ) -> Result<(), AuthError> {
        let device_info = device_info
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AuthError::Internal(format!("device info: {e}")))?;
        let mut inner = self.lock();
        inner.next_refresh_id += 1;
        let record = RefreshTokenRecord {
            id: inner.next_refresh_id,
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            created_at: Utc::now(),
            revoked_at: None,
            device_info,
        };
        inner.refresh_tokens.push(record);
        Ok(())
    }

    async fn find_usable(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let now = Utc::now();
        let inner = self.lock();
        Ok(inner
            .refresh_tokens
            .iter()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none() && t.expires_at > now)
            .cloned())
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, AuthError> {
        let mut inner = self.lock();
        for t in inner.refresh_tokens.iter_mut() {
            if t.token_hash == token_hash && t.revoked_at.is_none() {
                t.revoked_at = Some(Utc::now());
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AuthError> {
        let now = Utc::now();
        let mut inner = self.lock();
        let mut flipped = 0;
        for t in inner.refresh_tokens.iter_mut() {
            if t.user_id == user_id && t.revoked_at.is_none() {
                t.revoked_at = Some(now);
                flipped += 1;
            }
        }
        Ok(flipped)
    }

    async fn delete_expired(&self) -> Result<u64, AuthError> {
        let now = Utc::now();
        let mut inner = self.lock();
        let before = inner.refresh_tokens.len();
        inner.refresh_tokens.retain(|t| t.expires_at >= now);
        Ok((before - inner.refresh_tokens.len()) as u64)
    }

    async fn delete_revoked_expired(&self) -> Result<u64, AuthError> {
        let now = Utc::now();
        let mut inner = self.lock();
        let before = inner.refresh_tokens.len();
        inner
            .refresh_tokens
            .retain(|t| t.revoked_at.is_none() || t.expires_at >= now);
        Ok((before - inner.refresh_tokens.len()) as u64)
    }

    async fn delete_expired_for_user(&self, user_id: i64) -> Result<u64, AuthError> {
        let now = Utc::now();
        let mut inner = self.lock();
        let before = inner.refresh_tokens.len();
        inner
            .refresh_tokens
            .retain(|t| t.user_id != user_id || t.expires_at >= now);
        Ok((before - inner.refresh_tokens.len()) as u64)
    }

    async fn count_all(&self) -> Result<i64, AuthError> {
        Ok(self.lock().refresh_tokens.len() as i64)
    }

    async fn count_expired(&self) -> Result<i64, AuthError> {
        let now = Utc::now();
        let inner = self.lock();
        Ok(inner
            .refresh_tokens
            .iter()
            .filter(|t| t.expires_at < now)
            .count() as i64)
    }

    async fn count_revoked(&self) -> Result<i64, AuthError> {
        let inner = self.lock();
        Ok(inner
            .refresh_tokens
            .iter()
            .filter(|t| t.revoked_at.is_some())
            .count() as i64)
    }
}

#[async_trait]
impl RevokedTokenStore for MemoryStore {
    async fn revoke(
        &self,
        jti: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let mut inner = self.lock();
        if inner.revoked_tokens.iter().any(|t| t.jti == jti) {
            return Ok(());
        }
        inner.next_revoked_id += 1;
        let record = RevokedTokenRecord {
            id: inner.next_revoked_id,
            jti: jti.to_string(),
            user_id,
            revoked_at: Utc::now(),
            expires_at,
        };
        inner.revoked_tokens.push(record);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        Ok(self.lock().revoked_tokens.iter().any(|t| t.jti == jti))
    }

    async fn delete_expired(&self) -> Result<u64, AuthError> {
        let now = Utc::now();
        let mut inner = self.lock();
        let before = inner.revoked_tokens.len();
        inner.revoked_tokens.retain(|t| t.expires_at >= now);
        Ok((before - inner.revoked_tokens.len()) as u64)
    }

    async fn count_all(&self) -> Result<i64, AuthError> {
        Ok(self.lock().revoked_tokens.len() as i64)
    }

    async fn count_expired(&self) -> Result<i64, AuthError> {
        let now = Utc::now();
        let inner = self.lock();
        Ok(inner
            .revoked_tokens
            .iter()
            .filter(|t| t.expires_at < now)
            .count() as i64)
    }
}
