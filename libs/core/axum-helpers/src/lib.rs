//! # Axum Helpers
//!
//! Shared HTTP plumbing for the accounts service.
//!
//! - **[`server`]**: router assembly, health endpoints, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: `AppError` and the `{path, timestamp, message}` error body
//! - **[`i18n`]**: `Accept-Language` negotiation and localized error rendering
//! - **[`extractors`]**: validated JSON

pub mod errors;
pub mod extractors;
pub mod http;
pub mod i18n;
pub mod server;

pub use server::{
    CleanupCoordinator, HealthCheckFuture, HealthResponse, ShutdownCoordinator, close_postgres,
    create_app, create_production_app, create_router, health_router, run_health_checks,
    shutdown_signal,
};

pub use http::{cors_layer_from_env, security_headers};

pub use errors::{AppError, ErrorResponse, FieldErrors, LocalizableError, VALIDATION_FAILURE};

pub use i18n::{Catalog, Locale, localize_errors};

pub use extractors::ValidatedJson;
