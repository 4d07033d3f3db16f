use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::messages::MessageKey;
use crate::models::User;

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. A taken email fails with `email_inuse`.
    async fn create(&self, user: User) -> UserResult<User>;

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn find_by_activation_token(&self, token: &str) -> UserResult<Option<User>>;

    async fn find_by_reset_token(&self, token: &str) -> UserResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> UserResult<bool>;

    /// Persist every field of an existing user
    async fn update(&self, user: User) -> UserResult<User>;

    async fn delete(&self, id: Uuid) -> UserResult<bool>;

    /// Set a fresh reset token on one user. `false` when the user is gone.
    async fn store_reset_token(&self, id: Uuid, token: &str, requested_at: DateTime<Utc>) -> UserResult<bool>;

    /// In one conditional write: set `password_hash` on the user holding
    /// `token`, clear the token and activate the account. At most one caller
    /// gets the user id back for a given token.
    async fn consume_reset_token(&self, token: &str, password_hash: String) -> UserResult<Option<Uuid>>;

    /// Set the username, and the image when given, of an active user.
    /// `None` when no active user has `id`.
    async fn update_profile(&self, id: Uuid, username: String, image: Option<String>) -> UserResult<Option<User>>;

    /// Active users in creation order, optionally without `exclude`
    async fn find_active(&self, exclude: Option<Uuid>, offset: u64, limit: u64) -> UserResult<Vec<User>>;

    async fn count_active(&self, exclude: Option<Uuid>) -> UserResult<u64>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn listed(user: &User, exclude: Option<Uuid>) -> bool {
    user.active && Some(user.id) != exclude
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == user.email) {
            return Err(UserError::field("email", MessageKey::EmailInuse));
        }

        users.push(user.clone());
        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_activation_token(&self, token: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.activation_token.as_deref() == Some(token))
            .cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.password_reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(UserError::NotFound)?;
        *slot = user.clone();

        tracing::debug!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);

        let deleted = users.len() < before;
        if deleted {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(deleted)
    }

    async fn store_reset_token(&self, id: Uuid, token: &str, requested_at: DateTime<Utc>) -> UserResult<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };

        user.password_reset_token = Some(token.to_owned());
        user.password_reset_requested_at = Some(requested_at);
        user.touch();
        Ok(true)
    }

    async fn consume_reset_token(&self, token: &str, password_hash: String) -> UserResult<Option<Uuid>> {
        let mut users = self.users.write().await;
        let Some(user) = users
            .iter_mut()
            .find(|u| u.password_reset_token.as_deref() == Some(token))
        else {
            return Ok(None);
        };

        user.password_hash = password_hash;
        user.password_reset_token = None;
        user.password_reset_requested_at = None;
        user.active = true;
        user.activation_token = None;
        user.touch();
        Ok(Some(user.id))
    }

    async fn update_profile(&self, id: Uuid, username: String, image: Option<String>) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id && u.active) else {
            return Ok(None);
        };

        user.username = username;
        if image.is_some() {
            user.image = image;
        }
        user.touch();
        Ok(Some(user.clone()))
    }

    async fn find_active(&self, exclude: Option<Uuid>, offset: u64, limit: u64) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| listed(u, exclude))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_active(&self, exclude: Option<Uuid>) -> UserResult<u64> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| listed(u, exclude)).count() as u64)
    }
}
