//! Opaque bearer tokens issued at login.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::UserResult;

/// A token stays valid while it was used within this many days.
pub const TOKEN_MAX_IDLE_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthToken {
    pub token: String,
    pub user_id: Uuid,
    pub last_used_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn new(token: String, user_id: Uuid) -> Self {
        Self {
            token,
            user_id,
            last_used_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.last_used_at <= idle_cutoff(now)
    }
}

/// Tokens last used at or before this instant are expired.
pub fn idle_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(TOKEN_MAX_IDLE_DAYS)
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create(&self, token: AuthToken) -> UserResult<AuthToken>;

    async fn find(&self, token: &str) -> UserResult<Option<AuthToken>>;

    /// Set `last_used_at` to `at`
    async fn touch(&self, token: &str, at: DateTime<Utc>) -> UserResult<()>;

    async fn delete(&self, token: &str) -> UserResult<bool>;

    async fn delete_for_user(&self, user_id: Uuid) -> UserResult<u64>;

    /// Remove tokens last used before `cutoff`
    async fn delete_unused_since(&self, cutoff: DateTime<Utc>) -> UserResult<u64>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<String, AuthToken>>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn create(&self, token: AuthToken) -> UserResult<AuthToken> {
        self.tokens.write().await.insert(token.token.clone(), token.clone());
        Ok(token)
    }

    async fn find(&self, token: &str) -> UserResult<Option<AuthToken>> {
        Ok(self.tokens.read().await.get(token).cloned())
    }

    async fn touch(&self, token: &str, at: DateTime<Utc>) -> UserResult<()> {
        if let Some(entry) = self.tokens.write().await.get_mut(token) {
            entry.last_used_at = at;
        }
        Ok(())
    }

    async fn delete(&self, token: &str) -> UserResult<bool> {
        Ok(self.tokens.write().await.remove(token).is_some())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> UserResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_unused_since(&self, cutoff: DateTime<Utc>) -> UserResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.last_used_at >= cutoff);
        Ok((before - tokens.len()) as u64)
    }
}
