use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity::{auth_token, user},
    error::{UserError, UserResult},
    messages::MessageKey,
    models::User,
    repository::UserRepository,
    token::{AuthToken, TokenRepository},
};

#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn active(exclude: Option<Uuid>) -> Select<user::Entity> {
        let query = user::Entity::find().filter(user::Column::Active.eq(true));
        match exclude {
            Some(id) => query.filter(user::Column::Id.ne(id)),
            None => query,
        }
    }
}

/// The unique index on `users.email` is the last line of defence against
/// concurrent registrations.
fn map_insert_error(err: DbErr) -> UserError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email") => {
            UserError::field("email", MessageKey::EmailInuse)
        }
        _ => err.into(),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let active_model: user::ActiveModel = user.into();
        let model = active_model.insert(&self.db).await.map_err(map_insert_error)?;

        tracing::info!(user_id = %model.id, "Created user");
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_activation_token(&self, token: &str) -> UserResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::ActivationToken.eq(token))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_reset_token(&self, token: &str) -> UserResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::PasswordResetToken.eq(token))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let id = user.id;
        let active_model: user::ActiveModel = user.into();

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => UserError::NotFound,
            other => other.into(),
        })?;

        tracing::debug!(user_id = %id, "Updated user");
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let result = user::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(result.rows_affected > 0)
    }

    async fn store_reset_token(&self, id: Uuid, token: &str, requested_at: DateTime<Utc>) -> UserResult<bool> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::PasswordResetToken, Expr::value(token))
            .col_expr(
                user::Column::PasswordResetRequestedAt,
                Expr::value(requested_at.fixed_offset()),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// `UPDATE ... WHERE password_reset_token = $1 RETURNING *`: a concurrent
    /// request with the same token re-checks the condition and matches nothing.
    async fn consume_reset_token(&self, token: &str, password_hash: String) -> UserResult<Option<Uuid>> {
        let models = user::Entity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::PasswordResetToken, Expr::value(Option::<String>::None))
            .col_expr(
                user::Column::PasswordResetRequestedAt,
                Expr::value(Option::<DateTimeWithTimeZone>::None),
            )
            .col_expr(user::Column::Active, Expr::value(true))
            .col_expr(user::Column::ActivationToken, Expr::value(Option::<String>::None))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
            .filter(user::Column::PasswordResetToken.eq(token))
            .exec_with_returning(&self.db)
            .await?;

        Ok(models.into_iter().next().map(|model| model.id))
    }

    async fn update_profile(&self, id: Uuid, username: String, image: Option<String>) -> UserResult<Option<User>> {
        let mut update = user::Entity::update_many()
            .col_expr(user::Column::Username, Expr::value(username))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()));
        if let Some(image) = image {
            update = update.col_expr(user::Column::Image, Expr::value(image));
        }

        let models = update
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::Active.eq(true))
            .exec_with_returning(&self.db)
            .await?;

        Ok(models.into_iter().next().map(Into::into))
    }

    async fn find_active(&self, exclude: Option<Uuid>, offset: u64, limit: u64) -> UserResult<Vec<User>> {
        let models = Self::active(exclude)
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_active(&self, exclude: Option<Uuid>) -> UserResult<u64> {
        Ok(Self::active(exclude).count(&self.db).await?)
    }
}

#[derive(Clone)]
pub struct PgTokenRepository {
    db: DatabaseConnection,
}

impl PgTokenRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn create(&self, token: AuthToken) -> UserResult<AuthToken> {
        let active_model: auth_token::ActiveModel = token.into();
        let model = active_model.insert(&self.db).await?;
        Ok(model.into())
    }

    async fn find(&self, token: &str) -> UserResult<Option<AuthToken>> {
        let model = auth_token::Entity::find_by_id(token.to_owned()).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn touch(&self, token: &str, at: DateTime<Utc>) -> UserResult<()> {
        auth_token::Entity::update_many()
            .col_expr(auth_token::Column::LastUsedAt, Expr::value(at.fixed_offset()))
            .filter(auth_token::Column::Token.eq(token))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn delete(&self, token: &str) -> UserResult<bool> {
        let result = auth_token::Entity::delete_by_id(token.to_owned())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> UserResult<u64> {
        let result = auth_token::Entity::delete_many()
            .filter(auth_token::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete_unused_since(&self, cutoff: DateTime<Utc>) -> UserResult<u64> {
        let result = auth_token::Entity::delete_many()
            .filter(auth_token::Column::LastUsedAt.lt(cutoff.fixed_offset()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
