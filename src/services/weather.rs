//! OpenWeather client.
//!
//! Resolves a free-text city name through the Geocoding API, then fetches
//! current conditions and the 5-day/3-hour forecast in parallel.
//! See: https://openweathermap.org/api/geocoding-api and
//! https://openweathermap.org/forecast5

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::helpers::{format_display_date, round_to_i64};

/// Raw forecast samples per day (3-hour interval).
const SAMPLES_PER_DAY: usize = 8;
/// Number of days in the served forecast.
const FORECAST_DAYS: usize = 5;
/// Unit system requested from OpenWeather (°F, mph).
const UNITS: &str = "imperial";

/// Client for the OpenWeather geocoding and weather APIs.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    api_key: String,
    geo_url: String,
    data_url: String,
}

/// Resolved location of a city query.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Coordinates {
    /// Latitude (WGS84)
    pub lat: f64,
    /// Longitude (WGS84)
    pub lon: f64,
    /// Display name reported by the geocoder
    pub name: String,
}

/// One normalized weather sample.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    /// Calendar date of the sample (M/D/YYYY, server local time)
    pub date: String,
    /// Temperature in °F, rounded
    pub temperature: i64,
    /// Relative humidity percentage
    pub humidity: i64,
    /// Wind speed in mph, rounded
    pub wind_speed: i64,
    /// Condition text (e.g. "scattered clouds")
    pub description: String,
    /// OpenWeather icon code (e.g. "03d")
    pub icon: String,
}

/// Current conditions plus the daily forecast for a city.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeatherResult {
    pub current: WeatherReading,
    /// Up to five daily readings in chronological order
    pub forecast: Vec<WeatherReading>,
    pub coordinates: Coordinates,
}

// --- OpenWeather JSON response types ---

#[derive(Debug, Deserialize)]
struct GeoCandidate {
    lat: f64,
    lon: f64,
    name: String,
}

/// Shared shape of `/weather` responses and `/forecast` list entries.
#[derive(Debug, Deserialize)]
struct OwmSample {
    dt: i64,
    main: OwmMain,
    wind: OwmWind,
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmForecast {
    list: Vec<OwmSample>,
}

impl WeatherClient {
    /// Build a client. Fails if the API key or base URL is missing.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AppError::Configuration(
                "Weather API key is not configured (set API_KEY)".to_string(),
            ));
        }

        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(AppError::Configuration(
                "Weather API base URL is not configured (set API_BASE_URL)".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            geo_url: format!("{}/geo/1.0", base_url),
            data_url: format!("{}/data/2.5", base_url),
        })
    }

    /// Resolve `city` and fetch its current weather and 5-day forecast.
    ///
    /// The first geocoding match is used as-is; ambiguous names are not
    /// disambiguated.
    pub async fn get_weather_for_city(&self, city: &str) -> Result<WeatherResult, AppError> {
        let coordinates = self.geocode(city).await?;
        tracing::debug!(
            "Resolved '{}' to {} ({}, {})",
            city,
            coordinates.name,
            coordinates.lat,
            coordinates.lon
        );

        let (current, forecast) = self.fetch_weather(&coordinates).await?;

        Ok(WeatherResult {
            current: parse_sample(&current, &Local)?,
            forecast: build_forecast(&forecast.list, &Local)?,
            coordinates,
        })
    }

    async fn geocode(&self, city: &str) -> Result<Coordinates, AppError> {
        let url = format!("{}/direct", self.geo_url);
        let query = [("q", city), ("limit", "1"), ("appid", self.api_key.as_str())];
        let candidates: Vec<GeoCandidate> = self.get_json(&url, &query, "geocoding").await?;

        let first = candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("City not found".to_string()))?;

        Ok(Coordinates {
            lat: first.lat,
            lon: first.lon,
            name: first.name,
        })
    }

    /// Fetch current conditions and forecast concurrently.
    ///
    /// If either request fails the other is dropped.
    async fn fetch_weather(
        &self,
        coordinates: &Coordinates,
    ) -> Result<(OwmSample, OwmForecast), AppError> {
        let lat = coordinates.lat.to_string();
        let lon = coordinates.lon.to_string();
        let query = [
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("units", UNITS),
            ("appid", self.api_key.as_str()),
        ];

        let current_url = format!("{}/weather", self.data_url);
        let forecast_url = format!("{}/forecast", self.data_url);

        futures::future::try_join(
            self.get_json::<OwmSample>(&current_url, &query, "current weather"),
            self.get_json::<OwmForecast>(&forecast_url, &query, "forecast"),
        )
        .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T, AppError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("{} request failed: {}", what, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "{} returned HTTP {}",
                what,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("{} response parse error: {}", what, e)))
    }
}

/// Map one raw sample to a reading, with the date rendered in `tz`.
fn parse_sample<Tz: TimeZone>(sample: &OwmSample, tz: &Tz) -> Result<WeatherReading, AppError>
where
    Tz::Offset: std::fmt::Display,
{
    let condition = sample.weather.first().ok_or_else(|| {
        AppError::Upstream(format!("sample at {} has no weather condition", sample.dt))
    })?;

    Ok(WeatherReading {
        date: format_display_date(sample.dt, tz),
        temperature: round_to_i64(sample.main.temp),
        humidity: round_to_i64(sample.main.humidity),
        wind_speed: round_to_i64(sample.wind.speed),
        description: condition.description.clone(),
        icon: condition.icon.clone(),
    })
}

/// Pick one sample per day (every 8th, starting with the first) for up to five days.
fn build_forecast<Tz: TimeZone>(
    samples: &[OwmSample],
    tz: &Tz,
) -> Result<Vec<WeatherReading>, AppError>
where
    Tz::Offset: std::fmt::Display,
{
    samples
        .iter()
        .step_by(SAMPLES_PER_DAY)
        .take(FORECAST_DAYS)
        .map(|s| parse_sample(s, tz))
        .collect()
}
