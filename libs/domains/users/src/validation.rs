//! Field predicates used by the request models and the service.

use crate::messages::MessageKey;
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};
use validator::ValidationError;

/// Decoded profile images may be at most 2 MiB.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Length of activation, reset and auth tokens.
pub const TOKEN_LENGTH: usize = 32;

fn error(key: MessageKey) -> ValidationError {
    ValidationError::new(key.key())
}

/// At least 8 characters with a lowercase letter, an uppercase letter and a digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        return Err(error(MessageKey::PasswordSize));
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(error(MessageKey::PasswordPattern));
    }

    Ok(())
}

pub fn decode_image(image: &str) -> Result<Vec<u8>, MessageKey> {
    let bytes = STANDARD
        .decode(image.trim())
        .map_err(|_| MessageKey::UnsupportedImageFile)?;

    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(MessageKey::ProfileImageSize);
    }
    Ok(bytes)
}

pub fn validate_image(image: &str) -> Result<(), ValidationError> {
    decode_image(image).map(|_| ()).map_err(error)
}

/// Random alphanumeric token from the thread-local CSPRNG.
pub fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
