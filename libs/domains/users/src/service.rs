use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::FieldErrors;
use chrono::Utc;
use domain_notifications::AccountMailer;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::images::ImageStore;
use crate::messages::MessageKey;
use crate::models::{
    AuthResponse, Credentials, PasswordResetRequest, PasswordUpdate, RegisterUser, UpdateUser, User, UserProfile,
    UserSummary,
};
use crate::pagination::{Page, PageRequest};
use crate::repository::UserRepository;
use crate::token::{AuthToken, TokenRepository};
use crate::validation::{TOKEN_LENGTH, decode_image, random_token};

const DEFAULT_RESET_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Service layer for User business logic
pub struct UserService<R: UserRepository, T: TokenRepository> {
    users: Arc<R>,
    tokens: Arc<T>,
    mailer: Arc<AccountMailer>,
    images: Arc<dyn ImageStore>,
    reset_token_ttl: Duration,
}

impl<R: UserRepository, T: TokenRepository> Clone for UserService<R, T> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            tokens: Arc::clone(&self.tokens),
            mailer: Arc::clone(&self.mailer),
            images: Arc::clone(&self.images),
            reset_token_ttl: self.reset_token_ttl,
        }
    }
}

impl<R: UserRepository, T: TokenRepository> UserService<R, T> {
    pub fn new(users: R, tokens: T, mailer: AccountMailer, images: Arc<dyn ImageStore>) -> Self {
        Self {
            users: Arc::new(users),
            tokens: Arc::new(tokens),
            mailer: Arc::new(mailer),
            images,
            reset_token_ttl: DEFAULT_RESET_TOKEN_TTL,
        }
    }

    pub fn with_reset_token_ttl(mut self, ttl: Duration) -> Self {
        self.reset_token_ttl = ttl;
        self
    }

    /// Register an inactive user and send the activation email.
    ///
    /// A failed email removes the user again, so the address can be reused.
    pub async fn register(&self, input: RegisterUser) -> UserResult<()> {
        let mut errors = validation_errors(&input);
        if let Some(email) = input.email.as_deref() {
            if !errors.contains("email") && self.users.email_exists(email).await? {
                errors.insert("email", MessageKey::EmailInuse.key());
            }
        }
        if !errors.is_empty() {
            return Err(UserError::Validation(errors));
        }

        let (Some(username), Some(email), Some(password)) = (input.username, input.email, input.password) else {
            return Err(UserError::field("username", MessageKey::UsernameNull));
        };

        let password_hash = hash_password(&password)?;
        let activation_token = random_token(TOKEN_LENGTH);
        let user = self
            .users
            .create(User::new(username, email, password_hash, activation_token.clone()))
            .await?;

        if let Err(e) = self.mailer.send_account_activation(&user.email, &activation_token).await {
            tracing::warn!(user_id = %user.id, "Activation email failed; removing user");
            self.users.delete(user.id).await?;
            return Err(e.into());
        }

        tracing::info!(user_id = %user.id, "User registered");
        Ok(())
    }

    pub async fn activate(&self, token: &str) -> UserResult<()> {
        let mut user = self
            .users
            .find_by_activation_token(token)
            .await?
            .ok_or(UserError::ActivationFailure)?;

        user.active = true;
        user.activation_token = None;
        user.touch();
        self.users.update(user).await?;
        Ok(())
    }

    /// Check credentials and issue a bearer token.
    pub async fn login(&self, credentials: Credentials) -> UserResult<AuthResponse> {
        let (Some(email), Some(password)) = (credentials.email, credentials.password) else {
            return Err(UserError::AuthenticationFailure);
        };

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(UserError::AuthenticationFailure)?;

        if !verify_password(&password, &user.password_hash)? {
            return Err(UserError::AuthenticationFailure);
        }
        if !user.active {
            return Err(UserError::InactiveAccount);
        }

        let token = self
            .tokens
            .create(AuthToken::new(random_token(TOKEN_LENGTH), user.id))
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(AuthResponse {
            id: user.id,
            username: user.username,
            image: user.image,
            token: token.token,
        })
    }

    pub async fn logout(&self, token: &str) -> UserResult<()> {
        self.tokens.delete(token).await?;
        Ok(())
    }

    /// Resolve a bearer token to its user, refreshing its last use.
    /// Unknown and expired tokens resolve to `None`.
    pub async fn resolve_token(&self, token: &str) -> UserResult<Option<Uuid>> {
        let now = Utc::now();
        let Some(found) = self.tokens.find(token).await? else {
            return Ok(None);
        };
        if found.is_expired(now) {
            return Ok(None);
        }

        self.tokens.touch(token, now).await?;
        Ok(Some(found.user_id))
    }

    pub async fn list_users(&self, request: PageRequest, exclude: Option<Uuid>) -> UserResult<Page<UserSummary>> {
        let total = self.users.count_active(exclude).await?;
        if request.offset() >= total {
            return Ok(Page::new(Vec::new(), request, total));
        }

        let users = self
            .users
            .find_active(exclude, request.offset(), request.size)
            .await?;

        Ok(Page::new(users.into_iter().map(Into::into).collect(), request, total))
    }

    /// Fetch an active user. Ids that are not UUIDs are simply not found.
    pub async fn get_user(&self, id: &str) -> UserResult<UserSummary> {
        let id = Uuid::parse_str(id).map_err(|_| UserError::NotFound)?;
        self.users
            .find_by_id(id)
            .await?
            .filter(|u| u.active)
            .map(Into::into)
            .ok_or(UserError::NotFound)
    }

    /// Only the user itself may update its profile.
    pub fn authorize_update(&self, caller: Option<Uuid>, id: &str) -> UserResult<Uuid> {
        match (caller, Uuid::parse_str(id)) {
            (Some(caller), Ok(id)) if caller == id => Ok(id),
            _ => Err(UserError::UnauthorizedUpdate),
        }
    }

    /// The new image is stored first and the record written second. The old
    /// file is removed only once the record points at the new one.
    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> UserResult<UserProfile> {
        let current = self
            .users
            .find_by_id(id)
            .await?
            .filter(|u| u.active)
            .ok_or(UserError::UnauthorizedUpdate)?;

        input.validate()?;
        let username = input.username.unwrap_or_else(|| current.username.clone());

        let stored = match input.image.as_deref() {
            Some(image) => {
                let bytes = decode_image(image).map_err(|key| UserError::field("image", key))?;
                Some(self.images.save(&bytes).await?)
            }
            None => None,
        };

        let written = self
            .users
            .update_profile(id, username, stored.clone())
            .await
            .and_then(|updated| updated.ok_or(UserError::UnauthorizedUpdate));
        let updated = match written {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(orphan) = stored.as_deref() {
                    self.remove_image(id, orphan).await;
                }
                return Err(e);
            }
        };

        if stored.is_some() {
            if let Some(previous) = current.image.as_deref() {
                self.remove_image(id, previous).await;
            }
        }

        tracing::info!(user_id = %id, "User profile updated");
        Ok(updated.into())
    }

    async fn remove_image(&self, user_id: Uuid, name: &str) {
        if let Err(e) = self.images.delete(name).await {
            tracing::warn!(user_id = %user_id, file = %name, error = %e, "Failed to remove profile image");
        }
    }

    /// Issue a reset token and email it.
    ///
    /// The token is stored before sending, so it stays valid if delivery fails.
    pub async fn request_password_reset(&self, input: PasswordResetRequest) -> UserResult<()> {
        input.validate()?;
        let Some(email) = input.email else {
            return Err(UserError::field("email", MessageKey::EmailInvalid));
        };

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(UserError::EmailNotInUse)?;

        let token = random_token(TOKEN_LENGTH);
        if !self.users.store_reset_token(user.id, &token, Utc::now()).await? {
            return Err(UserError::EmailNotInUse);
        }

        self.mailer.send_password_reset(&user.email, &token).await?;
        tracing::info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    /// Consume a reset token and set a new password.
    ///
    /// The token is checked before the password, and a rejected password
    /// leaves the token usable.
    pub async fn update_password(&self, input: PasswordUpdate) -> UserResult<()> {
        let token = input
            .password_reset_token
            .as_deref()
            .ok_or(UserError::UnauthorizedPasswordReset)?;

        let user = self
            .users
            .find_by_reset_token(token)
            .await?
            .ok_or(UserError::UnauthorizedPasswordReset)?;

        if self.reset_token_expired(&user) {
            tracing::debug!(user_id = %user.id, "Expired password reset token");
            return Err(UserError::UnauthorizedPasswordReset);
        }

        input.validate()?;
        let Some(password) = input.password else {
            return Err(UserError::field("password", MessageKey::PasswordNull));
        };

        let password_hash = hash_password(&password)?;
        let user_id = self
            .users
            .consume_reset_token(token, password_hash)
            .await?
            .ok_or(UserError::UnauthorizedPasswordReset)?;
        let revoked = self.tokens.delete_for_user(user_id).await?;

        tracing::info!(user_id = %user_id, revoked_tokens = revoked, "Password updated");
        Ok(())
    }

    fn reset_token_expired(&self, user: &User) -> bool {
        let Some(requested_at) = user.password_reset_requested_at else {
            return true;
        };
        let Ok(ttl) = chrono::Duration::from_std(self.reset_token_ttl) else {
            return false;
        };
        requested_at
            .checked_add_signed(ttl)
            .is_some_and(|expires_at| expires_at <= Utc::now())
    }
}

fn validation_errors<V: Validate>(input: &V) -> FieldErrors {
    match input.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::FileImageStore;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use crate::token::{InMemoryTokenRepository, MockTokenRepository};
    use base64::{Engine, engine::general_purpose::STANDARD};
    use domain_notifications::MemoryEmailProvider;
    use test_utils::TestUploadDir;

    type Service = UserService<InMemoryUserRepository, InMemoryTokenRepository>;

    struct Fixture {
        service: Service,
        users: InMemoryUserRepository,
        tokens: InMemoryTokenRepository,
        mail: MemoryEmailProvider,
        upload: TestUploadDir,
    }

    async fn fixture() -> Fixture {
        let users = InMemoryUserRepository::new();
        let tokens = InMemoryTokenRepository::new();
        let mail = MemoryEmailProvider::new();
        let upload = TestUploadDir::new();
        let images = FileImageStore::new(upload.path().join("profile")).await.unwrap();
        let mailer = AccountMailer::new(Arc::new(mail.clone()), "http://localhost:3000").unwrap();
        let service = UserService::new(users.clone(), tokens.clone(), mailer, Arc::new(images));

        Fixture {
            service,
            users,
            tokens,
            mail,
            upload,
        }
    }

    fn registration(i: usize) -> RegisterUser {
        RegisterUser {
            username: Some(format!("user{i}")),
            email: Some(format!("user{i}@mail.com")),
            password: Some("P4ssword".to_string()),
        }
    }

    impl Fixture {
        async fn active_user(&self, i: usize) -> User {
            self.service.register(registration(i)).await.unwrap();
            let email = format!("user{i}@mail.com");
            let user = self.users.find_by_email(&email).await.unwrap().unwrap();
            self.service
                .activate(user.activation_token.as_deref().unwrap())
                .await
                .unwrap();
            self.users.find_by_email(&email).await.unwrap().unwrap()
        }

        /// Active user inserted straight into the store, skipping password hashing.
        async fn seed_active(&self, i: usize) -> User {
            let mut user = User::new(
                format!("user{i}"),
                format!("user{i}@mail.com"),
                "hash".to_string(),
                format!("activation{i}"),
            );
            user.active = true;
            self.users.create(user).await.unwrap()
        }

        async fn reset_token(&self, i: usize) -> String {
            self.service
                .request_password_reset(PasswordResetRequest {
                    email: Some(format!("user{i}@mail.com")),
                })
                .await
                .unwrap();
            let user = self.users.find_by_email(&format!("user{i}@mail.com")).await.unwrap().unwrap();
            user.password_reset_token.unwrap()
        }
    }

    async fn with_mocks<U, T>(users: U, tokens: T, upload: &TestUploadDir) -> UserService<U, T>
    where
        U: UserRepository,
        T: TokenRepository,
    {
        let images = FileImageStore::new(upload.path()).await.unwrap();
        let mailer = AccountMailer::new(Arc::new(MemoryEmailProvider::new()), "http://localhost").unwrap();
        UserService::new(users, tokens, mailer, Arc::new(images))
    }

    fn field(err: UserError, name: &str) -> String {
        match err {
            UserError::Validation(fields) => fields.get(name).unwrap_or_default().to_string(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_creates_inactive_user_and_sends_activation() {
        let f = fixture().await;
        f.service.register(registration(1)).await.unwrap();

        let user = f.users.find_by_email("user1@mail.com").await.unwrap().unwrap();
        assert!(!user.active);
        assert_ne!(user.password_hash, "P4ssword");

        let token = user.activation_token.unwrap();
        assert_eq!(token.len(), 32);
        let email = f.mail.last_email().await.unwrap();
        assert_eq!(email.to_email, "user1@mail.com");
        assert!(email.text_body.contains(&token));
    }

    #[tokio::test]
    async fn register_rejects_email_in_use() {
        let f = fixture().await;
        f.service.register(registration(1)).await.unwrap();

        let err = f.service.register(registration(1)).await.unwrap_err();
        assert_eq!(field(err, "email"), "email_inuse");
    }

    #[tokio::test]
    async fn register_collects_all_field_errors() {
        let f = fixture().await;
        let err = f.service.register(RegisterUser::default()).await.unwrap_err();

        match err {
            UserError::Validation(fields) => assert_eq!(fields.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_with_failed_email_leaves_no_user() {
        let f = fixture().await;
        f.mail.set_failing(true);

        let err = f.service.register(registration(1)).await.unwrap_err();
        assert!(matches!(err, UserError::EmailDelivery(_)));
        assert!(!f.users.email_exists("user1@mail.com").await.unwrap());

        f.mail.set_failing(false);
        assert!(f.service.register(registration(1)).await.is_ok());
    }

    #[tokio::test]
    async fn register_deletes_created_user_when_mail_fails() {
        let mut users = MockUserRepository::new();
        users.expect_email_exists().returning(|_| Ok(false));
        users.expect_create().times(1).returning(Ok);
        users.expect_delete().times(1).returning(|_| Ok(true));

        let upload = TestUploadDir::new();
        let images = FileImageStore::new(upload.path()).await.unwrap();
        let mailer = AccountMailer::new(Arc::new(MemoryEmailProvider::failing()), "http://localhost").unwrap();
        let service = UserService::new(users, InMemoryTokenRepository::new(), mailer, Arc::new(images));

        assert!(matches!(
            service.register(registration(1)).await,
            Err(UserError::EmailDelivery(_))
        ));
    }

    #[tokio::test]
    async fn activation_with_unknown_token_fails() {
        let f = fixture().await;
        assert!(matches!(
            f.service.activate("unknown").await,
            Err(UserError::ActivationFailure)
        ));
    }

    #[tokio::test]
    async fn login_checks_password_then_activation() {
        let f = fixture().await;
        f.service.register(registration(1)).await.unwrap();

        let credentials = |password: &str| Credentials {
            email: Some("user1@mail.com".into()),
            password: Some(password.into()),
        };

        assert!(matches!(
            f.service.login(credentials("Wr0ngPassword")).await,
            Err(UserError::AuthenticationFailure)
        ));
        assert!(matches!(
            f.service.login(credentials("P4ssword")).await,
            Err(UserError::InactiveAccount)
        ));

        let user = f.users.find_by_email("user1@mail.com").await.unwrap().unwrap();
        f.service.activate(user.activation_token.as_deref().unwrap()).await.unwrap();

        let auth = f.service.login(credentials("P4ssword")).await.unwrap();
        assert_eq!(auth.id, user.id);
        assert_eq!(auth.token.len(), 32);
        assert_eq!(f.service.resolve_token(&auth.token).await.unwrap(), Some(user.id));
    }

    #[tokio::test]
    async fn login_with_unknown_email_fails() {
        let f = fixture().await;
        let result = f
            .service
            .login(Credentials {
                email: Some("nobody@mail.com".into()),
                password: Some("P4ssword".into()),
            })
            .await;
        assert!(matches!(result, Err(UserError::AuthenticationFailure)));
    }

    #[tokio::test]
    async fn expired_auth_token_does_not_resolve() {
        let f = fixture().await;
        let user = f.active_user(1).await;
        let mut token = AuthToken::new("stale".into(), user.id);
        token.last_used_at = Utc::now() - chrono::Duration::days(8);
        f.tokens.create(token).await.unwrap();

        assert_eq!(f.service.resolve_token("stale").await.unwrap(), None);
        assert_eq!(f.service.resolve_token("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let f = fixture().await;
        let user = f.active_user(1).await;
        f.tokens.create(AuthToken::new("bearer".into(), user.id)).await.unwrap();

        f.service.logout("bearer").await.unwrap();
        assert_eq!(f.service.resolve_token("bearer").await.unwrap(), None);
    }

    #[tokio::test]
    async fn reset_request_for_unknown_email_is_not_found() {
        let f = fixture().await;
        let result = f
            .service
            .request_password_reset(PasswordResetRequest {
                email: Some("unknown@mail.com".into()),
            })
            .await;
        assert!(matches!(result, Err(UserError::EmailNotInUse)));
    }

    #[tokio::test]
    async fn reset_request_with_invalid_email_is_validation_error() {
        let f = fixture().await;
        let err = f
            .service
            .request_password_reset(PasswordResetRequest { email: None })
            .await
            .unwrap_err();
        assert_eq!(field(err, "email"), "email_invalid");
    }

    #[tokio::test]
    async fn reset_request_persists_token_and_mails_it() {
        let f = fixture().await;
        f.active_user(1).await;

        let token = f.reset_token(1).await;
        assert!(token.len() >= 32);

        let email = f.mail.last_email().await.unwrap();
        assert_eq!(email.to_email, "user1@mail.com");
        assert!(email.text_body.contains("user1@mail.com"));
        assert!(email.text_body.contains(&token));
    }

    #[tokio::test]
    async fn reset_token_survives_failed_delivery() {
        let f = fixture().await;
        f.active_user(1).await;
        f.mail.set_failing(true);

        let result = f
            .service
            .request_password_reset(PasswordResetRequest {
                email: Some("user1@mail.com".into()),
            })
            .await;
        assert!(matches!(result, Err(UserError::EmailDelivery(_))));

        let user = f.users.find_by_email("user1@mail.com").await.unwrap().unwrap();
        let token = user.password_reset_token.unwrap();
        let update = PasswordUpdate {
            password: Some("N3wP4ssword".into()),
            password_reset_token: Some(token),
        };
        assert!(f.service.update_password(update).await.is_ok());
    }

    #[tokio::test]
    async fn update_password_with_unknown_token_is_unauthorized_even_if_invalid() {
        let f = fixture().await;
        for password in [None, Some("weak".to_string()), Some("N3wP4ssword".to_string())] {
            let update = PasswordUpdate {
                password,
                password_reset_token: Some("abcd".into()),
            };
            assert!(matches!(
                f.service.update_password(update).await,
                Err(UserError::UnauthorizedPasswordReset)
            ));
        }
    }

    #[tokio::test]
    async fn invalid_password_keeps_token_usable() {
        let f = fixture().await;
        f.active_user(1).await;
        let token = f.reset_token(1).await;

        let err = f
            .service
            .update_password(PasswordUpdate {
                password: Some("alllowercase".into()),
                password_reset_token: Some(token.clone()),
            })
            .await
            .unwrap_err();
        assert_eq!(field(err, "password"), "password_pattern");

        let user = f.users.find_by_email("user1@mail.com").await.unwrap().unwrap();
        assert_eq!(user.password_reset_token, Some(token));
    }

    #[tokio::test]
    async fn password_update_consumes_token_and_revokes_sessions() {
        let f = fixture().await;
        let before = f.active_user(1).await;
        f.tokens.create(AuthToken::new("session".into(), before.id)).await.unwrap();
        let token = f.reset_token(1).await;

        let update = PasswordUpdate {
            password: Some("N3wP4ssword".into()),
            password_reset_token: Some(token),
        };
        f.service.update_password(update.clone()).await.unwrap();

        let after = f.users.find_by_id(before.id).await.unwrap().unwrap();
        assert_ne!(after.password_hash, before.password_hash);
        assert_eq!(after.password_reset_token, None);
        assert_eq!(after.password_reset_requested_at, None);
        assert!(f.tokens.is_empty().await);

        assert!(matches!(
            f.service.update_password(update).await,
            Err(UserError::UnauthorizedPasswordReset)
        ));
    }

    #[tokio::test]
    async fn password_update_activates_user() {
        let f = fixture().await;
        f.service.register(registration(1)).await.unwrap();
        let token = f.reset_token(1).await;

        f.service
            .update_password(PasswordUpdate {
                password: Some("N3wP4ssword".into()),
                password_reset_token: Some(token),
            })
            .await
            .unwrap();

        let user = f.users.find_by_email("user1@mail.com").await.unwrap().unwrap();
        assert!(user.active);
        assert_eq!(user.activation_token, None);
    }

    #[tokio::test]
    async fn expired_reset_token_is_unauthorized() {
        let mut f = fixture().await;
        f.service = f.service.clone().with_reset_token_ttl(Duration::ZERO);
        f.active_user(1).await;
        let token = f.reset_token(1).await;

        let result = f
            .service
            .update_password(PasswordUpdate {
                password: Some("N3wP4ssword".into()),
                password_reset_token: Some(token),
            })
            .await;
        assert!(matches!(result, Err(UserError::UnauthorizedPasswordReset)));
    }

    #[tokio::test]
    async fn listing_pages_through_active_users() {
        let f = fixture().await;
        for i in 1..=11 {
            f.seed_active(i).await;
        }
        f.service.register(registration(99)).await.unwrap();

        let first = f.service.list_users(PageRequest::default(), None).await.unwrap();
        assert_eq!(first.content.len(), 10);
        assert_eq!(first.total_pages, 2);

        let second = f
            .service
            .list_users(PageRequest::from_params(Some("1"), None), None)
            .await
            .unwrap();
        assert_eq!(second.content.len(), 1);
        assert_eq!(second.content[0].username, "user11");
    }

    #[tokio::test]
    async fn listing_excludes_caller() {
        let f = fixture().await;
        let me = f.seed_active(1).await;
        f.seed_active(2).await;

        let page = f.service.list_users(PageRequest::default(), Some(me.id)).await.unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].username, "user2");
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn listing_empty_store() {
        let f = fixture().await;
        let page = f.service.list_users(PageRequest::default(), None).await.unwrap();
        assert_eq!(page, Page::new(vec![], PageRequest::default(), 0));
    }

    #[tokio::test]
    async fn get_user_hides_inactive_and_invalid_ids() {
        let f = fixture().await;
        let active = f.active_user(1).await;
        f.service.register(registration(2)).await.unwrap();
        let inactive = f.users.find_by_email("user2@mail.com").await.unwrap().unwrap();

        assert_eq!(f.service.get_user(&active.id.to_string()).await.unwrap().username, "user1");
        assert!(matches!(
            f.service.get_user(&inactive.id.to_string()).await,
            Err(UserError::NotFound)
        ));
        assert!(matches!(f.service.get_user("5").await, Err(UserError::NotFound)));
    }

    #[tokio::test]
    async fn authorize_update_requires_same_user() {
        let f = fixture().await;
        let id = Uuid::now_v7();

        assert_eq!(f.service.authorize_update(Some(id), &id.to_string()).unwrap(), id);
        assert!(f.service.authorize_update(Some(Uuid::now_v7()), &id.to_string()).is_err());
        assert!(f.service.authorize_update(None, &id.to_string()).is_err());
        assert!(f.service.authorize_update(Some(id), "5").is_err());
    }

    #[tokio::test]
    async fn update_replaces_image_and_removes_old_file() {
        let f = fixture().await;
        let user = f.active_user(1).await;
        let image = STANDARD.encode(b"first image");

        let first = f
            .service
            .update_user(
                user.id,
                UpdateUser {
                    username: Some("user1-updated".into()),
                    image: Some(image),
                },
            )
            .await
            .unwrap();
        assert_eq!(first.username, "user1-updated");
        assert_eq!(f.upload.file_count("profile"), 1);

        let second = f
            .service
            .update_user(
                user.id,
                UpdateUser {
                    username: Some("user1-updated".into()),
                    image: Some(STANDARD.encode(b"second image")),
                },
            )
            .await
            .unwrap();
        assert_ne!(first.image, second.image);
        assert_eq!(f.upload.file_count("profile"), 1);

        let third = f
            .service
            .update_user(
                user.id,
                UpdateUser {
                    username: Some("user1-again".into()),
                    image: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(third.image, second.image);
        assert_eq!(f.upload.file_count("profile"), 1);
    }

    #[tokio::test]
    async fn update_rejects_oversized_image() {
        let f = fixture().await;
        let user = f.active_user(1).await;
        let image = STANDARD.encode(vec![0u8; crate::validation::MAX_IMAGE_BYTES + 1]);

        let err = f
            .service
            .update_user(
                user.id,
                UpdateUser {
                    username: Some("user1".into()),
                    image: Some(image),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(field(err, "image"), "profile_image_size");
        assert_eq!(f.upload.file_count("profile"), 0);
    }

    #[tokio::test]
    async fn failed_profile_write_keeps_previous_image() {
        let upload = TestUploadDir::new();
        tokio::fs::write(upload.path().join("previous.png"), b"old image").await.unwrap();

        let mut current = User::new("user1".into(), "user1@mail.com".into(), "hash".into(), "activation".into());
        current.active = true;
        current.image = Some("previous.png".into());
        let id = current.id;

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        users
            .expect_update_profile()
            .times(1)
            .returning(|_, _, _| Err(UserError::Database("connection reset".into())));
        let service = with_mocks(users, InMemoryTokenRepository::new(), &upload).await;

        let result = service
            .update_user(
                id,
                UpdateUser {
                    username: Some("user1-updated".into()),
                    image: Some(STANDARD.encode(b"new image")),
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::Database(_))));
        assert!(upload.path().join("previous.png").exists());
        assert_eq!(upload.file_count(""), 1);
    }

    #[tokio::test]
    async fn page_past_the_end_skips_the_row_query() {
        let mut users = MockUserRepository::new();
        users.expect_count_active().returning(|_| Ok(3));
        users.expect_find_active().times(0);
        let upload = TestUploadDir::new();
        let service = with_mocks(users, InMemoryTokenRepository::new(), &upload).await;

        let page = service
            .list_users(PageRequest::from_params(Some("1000000000000000000"), None), None)
            .await
            .unwrap();

        assert!(page.content.is_empty());
        assert_eq!(page.page, 1_000_000_000_000_000_000);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn concurrent_password_updates_consume_the_token_once() {
        let f = fixture().await;
        f.active_user(1).await;
        let token = f.reset_token(1).await;

        let update = |password: &str| PasswordUpdate {
            password: Some(password.to_string()),
            password_reset_token: Some(token.clone()),
        };
        let (first, second) = tokio::join!(
            f.service.update_password(update("N3wPassword")),
            f.service.update_password(update("Oth3rPassword")),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            outcomes
                .iter()
                .any(|r| matches!(r, Err(UserError::UnauthorizedPasswordReset)))
        );
        let user = f.users.find_by_email("user1@mail.com").await.unwrap().unwrap();
        assert!(user.password_reset_token.is_none());
    }

    #[tokio::test]
    async fn password_update_losing_the_token_race_revokes_nothing() {
        let mut holder = User::new("user1".into(), "user1@mail.com".into(), "hash".into(), "activation".into());
        holder.password_reset_token = Some("reset-token".into());
        holder.password_reset_requested_at = Some(Utc::now());

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_reset_token()
            .returning(move |_| Ok(Some(holder.clone())));
        users.expect_consume_reset_token().times(1).returning(|_, _| Ok(None));
        let mut tokens = MockTokenRepository::new();
        tokens.expect_delete_for_user().times(0);
        let upload = TestUploadDir::new();
        let service = with_mocks(users, tokens, &upload).await;

        let result = service
            .update_password(PasswordUpdate {
                password: Some("N3wPassword".into()),
                password_reset_token: Some("reset-token".into()),
            })
            .await;

        assert!(matches!(result, Err(UserError::UnauthorizedPasswordReset)));
    }
}
