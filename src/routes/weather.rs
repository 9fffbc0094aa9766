//! Weather and search-history HTTP endpoints.
//!
//! - POST /weather
//! - GET /weather/history
//! - DELETE /weather/history/:id (and without an id, which is a 404)

use std::convert::Infallible;

use axum::extract::{FromRequest, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use super::{AppState, MessageResponse};
use crate::errors::{AppError, ErrorResponse};
use crate::services::history::City;
use crate::services::weather::WeatherResult;

/// Request body for POST /weather. `cityName` takes precedence over `city`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRequest {
    /// City to look up (e.g. "London")
    pub city_name: Option<String>,
    /// Alternative field name accepted for the city
    pub city: Option<String>,
}

impl WeatherRequest {
    /// First non-blank city field, trimmed.
    fn requested_city(&self) -> Option<&str> {
        [self.city_name.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|c| !c.is_empty())
    }
}

/// City request parsed from a JSON or urlencoded form body.
///
/// Holds `None` when the body is missing or does not parse; the handler
/// answers that with 400.
pub struct CityBody(Option<WeatherRequest>);

#[axum::async_trait]
impl<S> FromRequest<S> for CityBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let body = if is_form {
            Form::<WeatherRequest>::from_request(req, state)
                .await
                .ok()
                .map(|Form(body)| body)
        } else {
            Json::<WeatherRequest>::from_request(req, state)
                .await
                .ok()
                .map(|Json(body)| body)
        };

        Ok(Self(body))
    }
}

/// Get current weather and a 5-day forecast for a city.
///
/// Accepts a JSON or urlencoded form body. On success the city is also
/// recorded in the search history. A failure to record it is logged and does
/// not affect the response.
#[utoipa::path(
    post,
    path = "/weather",
    tag = "Weather",
    request_body = WeatherRequest,
    responses(
        (status = 200, description = "Current weather, forecast and resolved coordinates", body = WeatherResult),
        (status = 400, description = "City name missing", body = ErrorResponse),
        (status = 404, description = "City not found", body = ErrorResponse),
        (status = 500, description = "Upstream or configuration failure", body = ErrorResponse),
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    CityBody(body): CityBody,
) -> Result<Json<WeatherResult>, AppError> {
    let Some(city) = body.as_ref().and_then(WeatherRequest::requested_city) else {
        tracing::info!("Weather request without a city name");
        return Err(AppError::BadRequest("City name is required".to_string()));
    };

    tracing::info!("Fetching weather for '{}'", city);
    let result = state
        .weather_client
        .get_weather_for_city(city)
        .await
        .inspect_err(|e| tracing::warn!("Weather lookup for '{}' failed: {}", city, e))?;

    match state.history.add_city(city).await {
        Ok(entry) => tracing::debug!("History entry for '{}' is {}", city, entry.id),
        Err(e) => tracing::warn!("Failed to record '{}' in search history: {}", city, e),
    }

    Ok(Json(result))
}

/// List previously searched cities in insertion order.
#[utoipa::path(
    get,
    path = "/weather/history",
    tag = "History",
    responses(
        (status = 200, description = "Search history", body = Vec<City>),
        (status = 500, description = "History file unreadable", body = ErrorResponse),
    )
)]
pub async fn list_history(State(state): State<AppState>) -> Result<Json<Vec<City>>, AppError> {
    let cities = state
        .history
        .list_cities()
        .await
        .map_err(|e| AppError::storage("Failed to fetch search history", e))?;
    Ok(Json(cities))
}

/// Remove a city from the search history.
#[utoipa::path(
    delete,
    path = "/weather/history/{id}",
    tag = "History",
    params(
        ("id" = String, Path, description = "History entry id"),
    ),
    responses(
        (status = 200, description = "City removed", body = MessageResponse),
        (status = 404, description = "No city with that id", body = ErrorResponse),
        (status = 500, description = "History file could not be updated", body = ErrorResponse),
    )
)]
pub async fn delete_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = state
        .history
        .remove_city(&id)
        .await
        .map_err(|e| AppError::storage("Failed to delete city from history", e))?;

    if !removed {
        tracing::info!("No history entry with id {}", id);
        return Err(AppError::NotFound("City not found in history".to_string()));
    }

    Ok(Json(MessageResponse::new("City deleted successfully")))
}

/// DELETE without an id in the path.
pub async fn delete_history_without_id() -> Result<Json<MessageResponse>, AppError> {
    tracing::info!("History delete request without an id");
    Err(AppError::NotFound("City not found in history".to_string()))
}
