//! Shared helpers for normalizing upstream weather values.
//!
//! OpenWeather reports temperatures and wind speeds as floats and timestamps
//! as Unix seconds. Readings are served as whole numbers and display dates.

use chrono::{DateTime, TimeZone};

/// Round an f64 to the nearest integer (half away from zero).
///
/// Returns 0 for non-finite inputs (NaN, ±Inf).
pub(crate) fn round_to_i64(v: f64) -> i64 {
    if !v.is_finite() {
        tracing::warn!("round_to_i64 received non-finite value {}, defaulting to 0", v);
        return 0;
    }
    v.round() as i64
}

/// Render a Unix timestamp as a `M/D/YYYY` calendar date in the given zone.
///
/// Out-of-range timestamps render as an empty string.
pub(crate) fn format_display_date<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => utc.with_timezone(tz).format("%-m/%-d/%Y").to_string(),
        None => {
            tracing::warn!("Timestamp {} is out of range, leaving date empty", timestamp);
            String::new()
        }
    }
}
