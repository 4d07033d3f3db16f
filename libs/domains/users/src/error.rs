use axum_helpers::{AppError, FieldErrors};
use domain_notifications::NotificationError;
use thiserror::Error;
use validator::ValidationErrors;

use crate::messages::MessageKey;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("User not found")]
    NotFound,

    #[error("No user with this email")]
    EmailNotInUse,

    #[error("Invalid activation token")]
    ActivationFailure,

    #[error("Invalid credentials")]
    AuthenticationFailure,

    #[error("Account is inactive")]
    InactiveAccount,

    #[error("Not allowed to update this user")]
    UnauthorizedUpdate,

    #[error("Invalid or expired password reset token")]
    UnauthorizedPasswordReset,

    #[error("Email delivery failed: {0}")]
    EmailDelivery(#[from] NotificationError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Image storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Validation error for a single field.
    pub fn field(field: &str, key: MessageKey) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field, key.key());
        UserError::Validation(fields)
    }
}

impl From<ValidationErrors> for UserError {
    fn from(errors: ValidationErrors) -> Self {
        UserError::Validation(errors.into())
    }
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        UserError::Database(err.to_string())
    }
}

/// Maps domain errors to message keys and HTTP statuses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        let key = |key: MessageKey| key.key().to_string();
        match err {
            UserError::Validation(fields) => AppError::Validation(fields),
            UserError::NotFound => AppError::NotFound(key(MessageKey::UserNotFound)),
            UserError::EmailNotInUse => AppError::NotFound(key(MessageKey::EmailNotInuse)),
            UserError::ActivationFailure => AppError::BadRequest(key(MessageKey::AccountActivationFailure)),
            UserError::AuthenticationFailure => AppError::Unauthorized(key(MessageKey::AuthenticationFailure)),
            UserError::InactiveAccount => AppError::Forbidden(key(MessageKey::InactiveAuthenticationFailure)),
            UserError::UnauthorizedUpdate => AppError::Forbidden(key(MessageKey::UnauthorizedUserUpdate)),
            UserError::UnauthorizedPasswordReset => {
                AppError::Forbidden(key(MessageKey::UnauthorizedPasswordReset))
            }
            UserError::EmailDelivery(e) => {
                tracing::error!(error = %e, "Email delivery failed");
                AppError::BadGateway(key(MessageKey::EmailFailure))
            }
            UserError::PasswordHash(msg) | UserError::Storage(msg) | UserError::Database(msg) => {
                tracing::error!(error = %msg, "Internal error");
                AppError::InternalServerError(key(MessageKey::InternalError))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn statuses_follow_error_kinds() {
        let cases = [
            (UserError::field("email", MessageKey::EmailInuse), StatusCode::BAD_REQUEST),
            (UserError::ActivationFailure, StatusCode::BAD_REQUEST),
            (UserError::AuthenticationFailure, StatusCode::UNAUTHORIZED),
            (UserError::InactiveAccount, StatusCode::FORBIDDEN),
            (UserError::UnauthorizedUpdate, StatusCode::FORBIDDEN),
            (UserError::UnauthorizedPasswordReset, StatusCode::FORBIDDEN),
            (UserError::NotFound, StatusCode::NOT_FOUND),
            (UserError::EmailNotInUse, StatusCode::NOT_FOUND),
            (
                UserError::EmailDelivery(NotificationError::ProviderError("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (UserError::Database("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn internal_details_are_not_exposed() {
        match AppError::from(UserError::Database("connection reset".into())) {
            AppError::InternalServerError(key) => assert_eq!(key, "internal_error"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
