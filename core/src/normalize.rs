//! Response normalization.
//!
//! Walks a decoded payload and promotes string fields whose *name* looks
//! like a timestamp into [`ApiValue::Date`]. The rule is a naming
//! convention, not a type check: the value is only inspected once the key
//! has matched.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::provider::ApiSettings;
use crate::value::ApiValue;

/// Offset-less layouts, read as UTC.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Returns true if a field called `key` should hold a date-time.
///
/// A key qualifies when it mentions "date" or "time" (but not "timezone"),
/// is not a `use*` flag and is not plural; or when it ends in "start",
/// "end" or "_at". Matching ignores case.
pub fn is_date_field_name(key: &str) -> bool {
    let key = key.to_lowercase();
    let mentions_date = key.contains("date") || (key.contains("time") && !key.contains("timezone"));

    (mentions_date && !key.starts_with("use") && !key.ends_with('s'))
        || key.ends_with("start")
        || key.ends_with("end")
        || key.ends_with("_at")
}

/// Parse a date-time string in any of the layouts APIs commonly emit.
pub fn parse_date_time(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();

    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = DateTime::parse_from_rfc2822(s) {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(d.with_timezone(&Utc));
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(d) = NaiveDateTime::parse_from_str(s, format) {
            return Some(d.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

/// Normalize a decoded payload.
///
/// Arrays and objects are rebuilt recursively. Inside an object, a string
/// under a date-like key becomes a [`ApiValue::Date`] if it parses and
/// [`ApiValue::Undefined`] if it does not. Scalars pass through untouched.
pub fn normalize(value: ApiValue, settings: &ApiSettings) -> ApiValue {
    match value {
        ApiValue::Array(items) => {
            ApiValue::Array(items.into_iter().map(|v| normalize(v, settings)).collect())
        }
        ApiValue::Object(map) => ApiValue::Object(
            map.into_iter()
                .map(|(key, v)| {
                    let v = normalize_field(&key, v, settings);
                    (key, v)
                })
                .collect(),
        ),
        scalar => scalar,
    }
}

fn normalize_field(key: &str, value: ApiValue, settings: &ApiSettings) -> ApiValue {
    match value {
        ApiValue::Array(_) | ApiValue::Object(_) => normalize(value, settings),
        ApiValue::String(s) if settings.coerce_dates && is_date_field_name(key) => {
            match parse_date_time(&s) {
                Some(date) => ApiValue::Date(date),
                None => ApiValue::Undefined,
            }
        }
        other => other,
    }
}
