//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor that runs [`Validate`] after deserializing.
///
/// Failures become [`AppError::Validation`] with one message key per field,
/// so the body renders as `{message: validation_failure, validationErrors}`.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct ResetRequest {
///     #[validate(required(message = "email_null"), email(message = "email_invalid"))]
///     email: Option<String>,
/// }
///
/// async fn handler(ValidatedJson(payload): ValidatedJson<ResetRequest>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
