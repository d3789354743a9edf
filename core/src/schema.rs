//! Response schemas.
//!
//! # Design
//! A [`Validator`] receives the normalized data block and returns the value
//! the caller will see, so it can both check and reshape (e.g. strip unknown
//! keys). Rejection is a [`ValidationError`] listing every issue found, each
//! with a machine-readable [`IssueCode`] and the path to the offending field.
//!
//! [`Schema`] is the built-in validator. Anything else that implements the
//! trait can be attached to a definition as well.

use serde::Serialize;
use thiserror::Error;

use crate::value::ApiValue;

/// Checks and transforms a normalized payload.
///
/// Implementations report bad data through `Err`. A panic inside `parse` is
/// treated as a bug in the validator and is not caught by the executor.
pub trait Validator: Send + Sync {
    fn parse(&self, value: ApiValue) -> Result<ApiValue, ValidationError>;
}

/// Category of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// The value has the wrong type, or a required field is missing.
    InvalidType,
    /// A strict object received keys it does not declare.
    UnrecognizedKeys,
    /// Raised by a custom validator.
    Custom,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::InvalidType => "invalid_type",
            IssueCode::UnrecognizedKeys => "unrecognized_keys",
            IssueCode::Custom => "custom",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found while validating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    /// Keys and array indices from the data block root to the field.
    pub path: Vec<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(code: IssueCode, path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path,
            message: message.into(),
        }
    }
}

/// A payload rejected by its schema.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("validation failed with {} issue(s)", .issues.len())]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }
}

/// Built-in structural schema.
#[derive(Debug, Clone)]
pub enum Schema {
    /// Accepts anything, unchanged.
    Any,
    String,
    Number,
    Boolean,
    /// Accepts fields the normalizer promoted to dates.
    Date,
    Array(Box<Schema>),
    /// Accepts a missing field in addition to the inner schema.
    Optional(Box<Schema>),
    Object(ObjectSchema),
}

impl Schema {
    pub fn array(item: Schema) -> Self {
        Schema::Array(Box::new(item))
    }

    pub fn optional(inner: Schema) -> Self {
        Schema::Optional(Box::new(inner))
    }

    fn check(&self, value: ApiValue, path: &mut Vec<String>, issues: &mut Vec<ValidationIssue>) -> ApiValue {
        match (self, value) {
            (Schema::Any, value) => value,
            (Schema::Optional(_), ApiValue::Undefined) => ApiValue::Undefined,
            (Schema::Optional(inner), value) => inner.check(value, path, issues),
            (Schema::String, value @ ApiValue::String(_))
            | (Schema::Number, value @ ApiValue::Number(_))
            | (Schema::Boolean, value @ ApiValue::Bool(_))
            | (Schema::Date, value @ ApiValue::Date(_)) => value,
            (Schema::Array(item), ApiValue::Array(items)) => ApiValue::Array(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, v)| {
                        path.push(idx.to_string());
                        let checked = item.check(v, path, issues);
                        path.pop();
                        checked
                    })
                    .collect(),
            ),
            (Schema::Object(object), ApiValue::Object(map)) => object.check(map, path, issues),
            (schema, value) => {
                issues.push(ValidationIssue::new(
                    IssueCode::InvalidType,
                    path.clone(),
                    format!("expected {}, received {}", schema.expected(), value.kind()),
                ));
                value
            }
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Schema::Any => "any",
            Schema::String => "string",
            Schema::Number => "number",
            Schema::Boolean => "boolean",
            Schema::Date => "date",
            Schema::Array(_) => "array",
            Schema::Optional(inner) => inner.expected(),
            Schema::Object(_) => "object",
        }
    }
}

impl Validator for Schema {
    fn parse(&self, value: ApiValue) -> Result<ApiValue, ValidationError> {
        let mut issues = Vec::new();
        let checked = self.check(value, &mut Vec::new(), &mut issues);
        if issues.is_empty() {
            Ok(checked)
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

/// Declared fields of an object schema.
///
/// Undeclared keys are dropped from the output unless the schema is
/// [`strict`](ObjectSchema::strict), in which case they are reported.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<(String, Schema)>,
    strict: bool,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.fields.push((name.into(), schema));
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    fn check(
        &self,
        mut map: std::collections::BTreeMap<String, ApiValue>,
        path: &mut Vec<String>,
        issues: &mut Vec<ValidationIssue>,
    ) -> ApiValue {
        let mut out = std::collections::BTreeMap::new();
        for (name, schema) in &self.fields {
            let value = map.remove(name).unwrap_or(ApiValue::Undefined);
            path.push(name.clone());
            let checked = schema.check(value, path, issues);
            path.pop();
            if !checked.is_undefined() {
                out.insert(name.clone(), checked);
            }
        }

        if self.strict && !map.is_empty() {
            let keys: Vec<String> = map.keys().map(|k| format!("'{k}'")).collect();
            issues.push(ValidationIssue::new(
                IssueCode::UnrecognizedKeys,
                path.clone(),
                format!("unrecognized key(s) in object: {}", keys.join(", ")),
            ));
        }

        ApiValue::Object(out)
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Self {
        Schema::Object(object)
    }
}
