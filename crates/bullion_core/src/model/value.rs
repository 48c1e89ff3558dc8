//! Field extraction helpers for loosely shaped backend JSON.
//!
//! # Responsibility
//! - Turn identifier-like values (strings, numbers, populated documents) into
//!   one string form.
//! - Turn timestamp-like values (epoch numbers, ISO-8601 strings) into epoch
//!   milliseconds.
//! - Read scalar fields leniently so one mistyped field never fails a record.
//!
//! # Invariants
//! - Helpers are total: unsupported shapes yield `None`, never a panic.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Extracts a string identifier from a JSON value.
///
/// Accepted shapes:
/// - `"abc"` -> `abc`
/// - `42` -> `42`
/// - `{"$oid": "abc"}` -> `abc`
/// - populated documents `{"_id": ..., ...}` / `{"id": ..., ...}`, resolved
///   recursively with `_id` taking precedence.
pub fn extract_id(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(map) => {
            if let Some(Value::String(oid)) = map.get("$oid") {
                return Some(oid.clone());
            }
            map.get("_id")
                .and_then(extract_id)
                .or_else(|| map.get("id").and_then(extract_id))
        }
        Value::Null | Value::Bool(_) | Value::Array(_) => None,
    }
}

/// Converts a timestamp-like JSON value to unix epoch milliseconds.
///
/// Numbers are taken as milliseconds. Strings are parsed as RFC 3339, then as
/// offset-less date-times or plain dates (both read as UTC), then as a
/// numeric string. `{"$date": ...}` wrappers are unwrapped.
pub fn epoch_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|millis| millis.trunc() as i64)),
        Value::String(text) => parse_datetime_millis(text),
        Value::Object(map) => map.get("$date").and_then(epoch_millis),
        Value::Null | Value::Bool(_) | Value::Array(_) => None,
    }
}

/// Parses a date/time string to unix epoch milliseconds.
pub fn parse_datetime_millis(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.timestamp_millis());
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp_millis());
    }

    trimmed.parse::<i64>().ok()
}

/// Serde field adapter: a value that does not fit `T` reads as `None`.
///
/// Use with `#[serde(default, deserialize_with = "lenient")]`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// JavaScript-style truthiness: `null`, `false`, `0`, `""` are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Display text for a scalar; structured values yield `None`.
pub fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Numeric value from a number or numeric string.
pub fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
