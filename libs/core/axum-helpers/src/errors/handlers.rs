use axum::{
    Json,
    extract::OriginalUri,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::ErrorResponse;

/// Fallback for unmatched routes.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> Response {
    let body = ErrorResponse::new(uri.path(), "Not Found");
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
