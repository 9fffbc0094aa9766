use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use super::{AppState, MessageResponse};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status ("ok" when healthy, "degraded" when history is unreadable)
    pub status: String,
    /// API version
    pub version: String,
    /// Whether the search history file can be read
    pub history_store: bool,
}

/// Health check endpoint.
///
/// Reads the search history to verify the store is usable. Returns status
/// "degraded" (still 200) if it is not.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let history_ok = state.history.list_cities().await.is_ok();

    Json(HealthResponse {
        status: if history_ok {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        history_store: history_ok,
    })
}

/// Liveness probe for the API routes.
#[utoipa::path(
    get,
    path = "/test",
    tag = "Health",
    responses(
        (status = 200, description = "API routes are mounted", body = MessageResponse),
    )
)]
pub async fn routes_check() -> Json<MessageResponse> {
    Json(MessageResponse::new("API routes are working"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::spawn_app;

    #[tokio::test]
    async fn test_routes_check() {
        let Json(body) = routes_check().await;
        assert_eq!(body.message, "API routes are working");
    }

    #[tokio::test]
    async fn test_health_ok_and_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let history_path = dir.path().join("searchHistory.json");
        let app = spawn_app(
            "http://127.0.0.1:9",
            &dir.path().join("dist"),
            &history_path,
            false,
        )
        .await;

        let body: serde_json::Value = app
            .http
            .get(app.url("/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["history_store"], true);

        std::fs::write(&history_path, "not json").unwrap();
        let body: serde_json::Value = app
            .http
            .get(app.url("/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["history_store"], false);
    }
}
