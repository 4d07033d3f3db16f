use axum::http::{HeaderValue, Method, header};
use core_config::Environment;
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Parses a comma-separated origin list such as
/// `http://localhost:3000, https://app.example.com`.
pub fn parse_allowed_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {e}"),
            )
        })?;

    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }

    Ok(origins)
}

/// Builds the CORS layer from `CORS_ALLOWED_ORIGIN`.
///
/// The variable is required in production. In development an unset value
/// yields a permissive layer.
pub fn cors_layer_from_env(environment: &Environment) -> io::Result<CorsLayer> {
    let raw = match std::env::var("CORS_ALLOWED_ORIGIN") {
        Ok(raw) => raw,
        Err(_) if environment.is_development() => {
            warn!("CORS_ALLOWED_ORIGIN not set, allowing any origin");
            return Ok(CorsLayer::permissive());
        }
        Err(_) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "CORS_ALLOWED_ORIGIN environment variable is required in production",
            ));
        }
    };

    let origins = parse_allowed_origins(&raw)?;
    info!(origins = %raw, "CORS configured");

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
        ])
        .max_age(Duration::from_secs(3600)))
}
