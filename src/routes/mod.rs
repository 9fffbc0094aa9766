use std::path::Path;
use std::sync::Arc;

use axum::handler::HandlerWithoutStateExt;
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use serde::Serialize;
use tower_http::services::ServeDir;
use utoipa::ToSchema;

use crate::services::history::HistoryStore;
use crate::services::weather::WeatherClient;

pub mod health;
pub mod spa;
pub mod weather;

/// Shared application state, constructed once at startup.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) weather_client: WeatherClient,
    pub(crate) history: Arc<HistoryStore>,
}

/// Plain confirmation body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build the API router with the single-page app as fallback.
///
/// Non-API paths serve files from `client_dist_dir`, falling back to its
/// `index.html` so client-side routes resolve. API paths hit with a method
/// they do not handle go to the same static service, so `GET /weather` loads
/// the app instead of answering 405.
pub(crate) fn router(state: AppState, client_dist_dir: &Path, expose_error_detail: bool) -> Router {
    let index_path = client_dist_dir.join("index.html");
    let index = move || {
        let index_path = index_path.clone();
        async move { spa::serve_index(&index_path).await }
    };
    let static_files = ServeDir::new(client_dist_dir).fallback(index.into_service());

    let router = Router::new()
        .route(
            "/weather",
            post(weather::get_weather).fallback_service(static_files.clone()),
        )
        .route(
            "/weather/history",
            get(weather::list_history)
                .delete(weather::delete_history_without_id)
                .fallback_service(static_files.clone()),
        )
        .route(
            "/weather/history/",
            delete(weather::delete_history_without_id).fallback_service(static_files.clone()),
        )
        .route(
            "/weather/history/:id",
            delete(weather::delete_history).fallback_service(static_files.clone()),
        )
        .route(
            "/test",
            get(health::routes_check).fallback_service(static_files.clone()),
        )
        .route(
            "/health",
            get(health::health_check).fallback_service(static_files.clone()),
        )
        .with_state(state)
        .fallback_service(static_files);

    if expose_error_detail {
        router.layer(middleware::map_response(crate::errors::expose_error_detail))
    } else {
        router
    }
}
