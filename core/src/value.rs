//! Decoded response payloads.
//!
//! # Design
//! `ApiValue` is the JSON data model plus the two shapes normalization can
//! introduce: `Date` for string fields promoted by the date heuristic and
//! `Undefined` for fields whose date string failed to parse. Objects use a
//! `BTreeMap`, so iteration order is by key.

use std::collections::BTreeMap;
use std::ops::Index;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

static UNDEFINED: ApiValue = ApiValue::Undefined;

/// A decoded (and possibly normalized) JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// A string field promoted to a timestamp during normalization.
    Date(DateTime<Utc>),
    /// A date-like field whose string could not be parsed.
    Undefined,
    Array(Vec<ApiValue>),
    Object(BTreeMap<String, ApiValue>),
}

impl ApiValue {
    /// An empty object, the payload of a `204 No Content` success.
    pub fn empty_object() -> Self {
        ApiValue::Object(BTreeMap::new())
    }

    /// Look up a key on an object. Returns `None` for non-objects and
    /// missing keys.
    pub fn get(&self, key: &str) -> Option<&ApiValue> {
        match self {
            ApiValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// True for `Null` and `Undefined`, the two values an envelope lookup
    /// skips over.
    pub fn is_absent(&self) -> bool {
        matches!(self, ApiValue::Null | ApiValue::Undefined)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, ApiValue::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ApiValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            ApiValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<ApiValue>> {
        match self {
            ApiValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, ApiValue>> {
        match self {
            ApiValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the variant, used in validation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiValue::Null => "null",
            ApiValue::Bool(_) => "boolean",
            ApiValue::Number(_) => "number",
            ApiValue::String(_) => "string",
            ApiValue::Date(_) => "date",
            ApiValue::Undefined => "undefined",
            ApiValue::Array(_) => "array",
            ApiValue::Object(_) => "object",
        }
    }

    /// Render back to plain JSON. Dates become RFC 3339 strings with
    /// millisecond precision; undefined object fields are dropped and
    /// undefined array elements become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ApiValue::Null | ApiValue::Undefined => serde_json::Value::Null,
            ApiValue::Bool(b) => serde_json::Value::Bool(*b),
            ApiValue::Number(n) => serde_json::Value::Number(n.clone()),
            ApiValue::String(s) => serde_json::Value::String(s.clone()),
            ApiValue::Date(d) => {
                serde_json::Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            ApiValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(ApiValue::to_json).collect())
            }
            ApiValue::Object(map) => serde_json::Value::Object(
                map.iter()
                    .filter(|(_, v)| !v.is_undefined())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for ApiValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ApiValue::Null,
            serde_json::Value::Bool(b) => ApiValue::Bool(b),
            serde_json::Value::Number(n) => ApiValue::Number(n),
            serde_json::Value::String(s) => ApiValue::String(s),
            serde_json::Value::Array(items) => {
                ApiValue::Array(items.into_iter().map(ApiValue::from).collect())
            }
            serde_json::Value::Object(map) => {
                ApiValue::Object(map.into_iter().map(|(k, v)| (k, ApiValue::from(v))).collect())
            }
        }
    }
}

impl From<&str> for ApiValue {
    fn from(s: &str) -> Self {
        ApiValue::String(s.to_string())
    }
}

impl From<String> for ApiValue {
    fn from(s: String) -> Self {
        ApiValue::String(s)
    }
}

impl From<bool> for ApiValue {
    fn from(b: bool) -> Self {
        ApiValue::Bool(b)
    }
}

impl From<i64> for ApiValue {
    fn from(n: i64) -> Self {
        ApiValue::Number(n.into())
    }
}

impl From<DateTime<Utc>> for ApiValue {
    fn from(d: DateTime<Utc>) -> Self {
        ApiValue::Date(d)
    }
}

impl Serialize for ApiValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Index<&str> for ApiValue {
    type Output = ApiValue;

    /// Missing keys and non-objects index to `Undefined`.
    fn index(&self, key: &str) -> &ApiValue {
        self.get(key).unwrap_or(&UNDEFINED)
    }
}

impl Index<usize> for ApiValue {
    type Output = ApiValue;

    fn index(&self, idx: usize) -> &ApiValue {
        match self {
            ApiValue::Array(items) => items.get(idx).unwrap_or(&UNDEFINED),
            _ => &UNDEFINED,
        }
    }
}
