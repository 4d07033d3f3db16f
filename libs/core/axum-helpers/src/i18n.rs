//! Locale negotiation and localized error rendering.
//!
//! Handlers return [`AppError`](crate::AppError) values that carry message keys.
//! [`localize_errors`] resolves the request locale from `Accept-Language` and
//! rewrites the error body through a [`Catalog`], so no global locale state exists.

use crate::errors::{ErrorResponse, LocalizableError};
use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{header::ACCEPT_LANGUAGE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;

/// Supported response languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    En,
    Vi,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Vi];

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Vi => "vi",
        }
    }

    /// Matches a language tag on its primary subtag (`vi-VN` -> `Vi`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split('-').next()?.trim();
        Locale::ALL
            .into_iter()
            .find(|locale| primary.eq_ignore_ascii_case(locale.tag()))
    }

    /// Picks the supported language with the highest quality from an
    /// `Accept-Language` value. Ties keep header order; anything else is `En`.
    pub fn negotiate(header: Option<&str>) -> Self {
        let Some(header) = header else {
            return Locale::default();
        };

        let mut ranges: Vec<(&str, f32)> = header
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';');
                let tag = parts.next()?.trim();
                if tag.is_empty() {
                    return None;
                }
                let quality = parts
                    .filter_map(|param| param.trim().split_once('='))
                    .find(|(key, _)| key.trim() == "q")
                    .and_then(|(_, value)| value.trim().parse::<f32>().ok())
                    .unwrap_or(1.0)
                    .clamp(0.0, 1.0);
                Some((tag, quality))
            })
            .filter(|(_, quality)| *quality > 0.0)
            .collect();

        ranges.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranges
            .into_iter()
            .find_map(|(tag, _)| Locale::from_tag(tag))
            .unwrap_or_default()
    }

    pub fn from_parts(parts: &Parts) -> Self {
        let header = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());
        Locale::negotiate(header)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_parts(parts))
    }
}

/// Pure `(locale, key) -> text` lookup.
pub type Catalog = fn(Locale, &str) -> Option<&'static str>;

pub fn localize(catalog: Catalog, locale: Locale, key: &str) -> String {
    catalog(locale, key).unwrap_or(key).to_string()
}

/// Middleware that renders [`LocalizableError`] responses as [`ErrorResponse`]
/// bodies with the full request path and the negotiated language.
///
/// ```ignore
/// Router::new()
///     .route("/users", post(register))
///     .layer(middleware::from_fn_with_state(messages::translate as Catalog, localize_errors));
/// ```
pub async fn localize_errors(State(catalog): State<Catalog>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let locale = Locale::from_parts(&parts);
    let path = match parts.extensions.get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri.path().to_string(),
        None => parts.uri.path().to_string(),
    };
    parts.extensions.insert(locale);

    let response = next.run(Request::from_parts(parts, body)).await;

    let Some(error) = response.extensions().get::<LocalizableError>().cloned() else {
        return response;
    };

    let mut body = ErrorResponse::new(path, localize(catalog, locale, &error.message));
    if let Some(fields) = error.validation_errors {
        let localized = fields
            .iter()
            .map(|(field, key)| (field.to_string(), localize(catalog, locale, key)))
            .collect();
        body = body.with_validation_errors(localized);
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    (parts, Json(body)).into_response()
}
