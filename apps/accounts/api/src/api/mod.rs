use axum::{Router, routing::get};
use std::path::Path;
use tower_http::services::ServeDir;

use crate::state::AppState;

pub mod health;
pub mod users;

/// API routes without the `/api` prefix, which `create_router` adds.
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/1.0", users::router(state))
}

/// `GET /ready` with a database ping.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

/// Stored profile images under `/images/{file}`.
pub fn images_router(dir: &Path) -> Router {
    Router::new().nest_service("/images", ServeDir::new(dir))
}
