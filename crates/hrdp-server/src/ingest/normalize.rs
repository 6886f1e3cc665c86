//! Field normalization
//!
//! Converts raw, untyped field values into typed ones. Every function here
//! is total and pure: malformed input yields `None` (or `FkValue::Invalid`),
//! never an error, so the rule chains in [`super::rules`] decide what a
//! failure means for the row.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Render a scalar JSON value as a string. Nulls, arrays and objects have
/// no scalar form.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parse an integer field. Trims whitespace; empty or non-numeric input is
/// `None`, not an error.
pub fn parse_int(value: &Value) -> Option<i32> {
    let s = scalar_to_string(value)?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i32>().ok()
}

/// Parse a timestamp field. Accepts ISO-8601 with an explicit offset, a
/// trailing literal `Z` (stripped and read as UTC), `T`- or space-separated
/// naive datetimes with optional fractional seconds, and bare dates
/// (midnight UTC). Anything else is `None`.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let s = scalar_to_string(value)?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    if let Ok(dt) = naive.parse::<NaiveDateTime>() {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = naive.parse::<NaiveDate>() {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    None
}

/// Parse a required string field. Trims whitespace; empty after trim is
/// `None`.
pub fn non_empty_string(value: &Value) -> Option<String> {
    let s = scalar_to_string(value)?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A normalized optional foreign-key value. Absent or blank values are
/// legitimately `Absent`; only present-but-unparsable input is `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FkValue {
    Absent,
    Id(i32),
    Invalid,
}

impl FkValue {
    pub fn is_invalid(&self) -> bool {
        matches!(self, FkValue::Invalid)
    }

    pub fn id(&self) -> Option<i32> {
        match self {
            FkValue::Id(id) => Some(*id),
            FkValue::Absent | FkValue::Invalid => None,
        }
    }
}

/// Parse an optional foreign-key field.
pub fn parse_fk(value: &Value) -> FkValue {
    let Some(s) = scalar_to_string(value) else {
        return FkValue::Absent;
    };
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return FkValue::Absent;
    }
    match trimmed.parse::<i32>() {
        Ok(id) => FkValue::Id(id),
        Err(_) => FkValue::Invalid,
    }
}
