use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::history::HistoryError;

/// Standard error response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Client-safe error summary
    pub error: String,
    /// Internal error detail, only present in development environments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}

/// Internal detail attached to an error response as an extension.
///
/// Stripped from the body by default; `expose_error_detail` folds it back in.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// History file failure. `public` is the message shown to clients.
    #[error("{public}: {source}")]
    Storage {
        public: &'static str,
        #[source]
        source: HistoryError,
    },
}

impl AppError {
    /// Wrap a history store failure with the message clients should see.
    pub fn storage(public: &'static str, source: HistoryError) -> Self {
        AppError::Storage { public, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Upstream(detail) => {
                tracing::error!("Upstream error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch weather data".to_string(),
                    Some(detail.clone()),
                )
            }
            AppError::Configuration(detail) => {
                tracing::error!("Configuration error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Weather service configuration error".to_string(),
                    Some(detail.clone()),
                )
            }
            AppError::Storage { public, source } => {
                tracing::error!("{}: {:?}", public, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    public.to_string(),
                    Some(source.to_string()),
                )
            }
        };

        let mut response = (status, Json(ErrorResponse::new(message))).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(ErrorDetail(detail));
        }
        response
    }
}

/// Response middleware that echoes internal error detail into the JSON body.
///
/// Only installed when the environment is development.
pub async fn expose_error_detail(response: Response) -> Response {
    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .ok()
        .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok());

    let error = body
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|v| v.as_str())
        .unwrap_or("Internal Server Error")
        .to_string();

    (
        status,
        Json(ErrorResponse {
            error,
            message: Some(detail),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("City not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<ErrorDetail>().is_none());

        let body = body_json(response).await;
        assert_eq!(body["error"], "City not found");
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_upstream_hides_detail_by_default() {
        let response = AppError::Upstream("geocoder returned HTTP 401".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to fetch weather data");
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_expose_error_detail_adds_message() {
        let response = AppError::Upstream("geocoder returned HTTP 401".to_string()).into_response();
        let response = expose_error_detail(response).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to fetch weather data");
        assert_eq!(body["message"], "geocoder returned HTTP 401");
    }

    #[tokio::test]
    async fn test_expose_error_detail_passes_through_plain_responses() {
        let response = AppError::BadRequest("City name is required".to_string()).into_response();
        let response = expose_error_detail(response).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_configuration_error_message() {
        let response = AppError::Configuration("API_KEY is empty".to_string()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "Weather service configuration error");
    }
}
