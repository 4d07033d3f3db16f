pub mod handlers;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Message key used for every failed request-body validation.
pub const VALIDATION_FAILURE: &str = "validation_failure";

/// Error body returned by every endpoint.
///
/// ```json
/// {
///   "path": "/api/1.0/users",
///   "timestamp": 1718000000000,
///   "message": "Validation Failure",
///   "validationErrors": { "email": "E-mail in use" }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Full request path
    pub path: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub message: String,
    #[serde(rename = "validationErrors", skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            message: message.into(),
            validation_errors: None,
        }
    }

    pub fn with_validation_errors(mut self, errors: BTreeMap<String, String>) -> Self {
        self.validation_errors = Some(errors);
        self
    }
}

/// Field name to message key, one entry per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` for `field` unless the field already failed.
    pub fn insert(&mut self, field: impl Into<String>, key: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| key.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<ValidationErrors> for FieldErrors {
    /// Keeps the first error per field. The error's message, or its code when
    /// no message is set, becomes the message key.
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            if let Some(err) = errs.first() {
                let key = err
                    .message
                    .as_deref()
                    .map(str::to_owned)
                    .unwrap_or_else(|| err.code.to_string());
                fields.insert(field.to_string(), key);
            }
        }
        fields
    }
}

/// Error data kept in the response extensions so [`crate::i18n::localize_errors`]
/// can render it in the caller's language.
#[derive(Debug, Clone)]
pub struct LocalizableError {
    pub message: String,
    pub validation_errors: Option<FieldErrors>,
}

/// HTTP-facing error. String payloads are message keys.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors.into())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::JsonExtractorRejection(e) => e.status(),
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn into_localizable(self) -> LocalizableError {
        match self {
            AppError::Validation(fields) => LocalizableError {
                message: VALIDATION_FAILURE.to_string(),
                validation_errors: Some(fields),
            },
            AppError::JsonExtractorRejection(e) => {
                tracing::debug!(rejection = %e.body_text(), "Unreadable request body");
                LocalizableError {
                    message: VALIDATION_FAILURE.to_string(),
                    validation_errors: None,
                }
            }
            AppError::BadRequest(key)
            | AppError::Unauthorized(key)
            | AppError::Forbidden(key)
            | AppError::NotFound(key)
            | AppError::BadGateway(key)
            | AppError::InternalServerError(key)
            | AppError::ServiceUnavailable(key) => LocalizableError {
                message: key,
                validation_errors: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let localizable = self.into_localizable();

        // Rendered with the raw keys when no localization layer is installed.
        let mut body = ErrorResponse::new("", localizable.message.clone());
        if let Some(fields) = &localizable.validation_errors {
            body = body.with_validation_errors(fields.clone().into_inner());
        }

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(localizable);
        response
    }
}
