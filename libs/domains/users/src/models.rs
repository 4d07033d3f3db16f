use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_image, validate_password};

/// User entity
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Unique across users
    pub email: String,
    pub password_hash: String,
    pub active: bool,
    pub activation_token: Option<String>,
    pub password_reset_token: Option<String>,
    pub password_reset_requested_at: Option<DateTime<Utc>>,
    /// Stored file name of the profile image
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New inactive user awaiting activation.
    pub fn new(username: String, email: String, password_hash: String, activation_token: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username,
            email,
            password_hash,
            active: false,
            activation_token: Some(activation_token),
            password_reset_token: None,
            password_reset_requested_at: None,
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Registration request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(
        required(message = "username_null"),
        length(min = 4, max = 32, message = "username_size")
    )]
    #[schema(example = "user1")]
    pub username: Option<String>,
    #[validate(required(message = "email_null"), email(message = "email_invalid"))]
    #[schema(example = "user1@mail.com")]
    pub email: Option<String>,
    #[validate(required(message = "password_null"), custom(function = "validate_password"))]
    #[schema(example = "P4ssword")]
    pub password: Option<String>,
}

/// Profile update. A missing `image` keeps the current one.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(
        required(message = "username_null"),
        length(min = 4, max = 32, message = "username_size")
    )]
    pub username: Option<String>,
    /// Base64 encoded image, at most 2 MiB once decoded
    #[validate(custom(function = "validate_image"))]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[validate(required(message = "email_invalid"), email(message = "email_invalid"))]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct PasswordUpdate {
    #[validate(required(message = "password_null"), custom(function = "validate_password"))]
    pub password: Option<String>,
    #[serde(rename = "passwordResetToken")]
    pub password_reset_token: Option<String>,
}

/// Raw paging parameters; invalid values are normalized, never rejected.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page index
    pub page: Option<String>,
    /// Page size, 1 to 10
    pub size: Option<String>,
}

/// Listing and single-user view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Returned after a profile update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub image: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            image: user.image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub id: Uuid,
    pub username: String,
    pub image: Option<String>,
    /// Bearer token for the `Authorization` header
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
