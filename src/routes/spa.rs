//! Single-page app entry document.

use std::path::Path;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

use crate::errors::ErrorResponse;

/// Serve `index.html` for any path not matched by an API route or static file.
pub(crate) async fn serve_index(index_path: &Path) -> Response {
    match tokio::fs::read_to_string(index_path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Error serving {}: {}", index_path.display(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Error serving the application")),
            )
                .into_response()
        }
    }
}
