//! Turning a definition plus call data into a concrete request.
//!
//! # Design
//! Composition is infallible. A location or payload the server cannot
//! make sense of comes back later as a transport failure or an error
//! status, never as a composition error.
//!
//! Provider base parameters are layered over caller data, so a caller can
//! never override authentication or configuration parameters. Provider auth
//! headers are layered over the `Content-Type` header for the same reason.

use std::sync::Arc;

use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::definition::ApiDefinition;
use crate::http::{HttpMethod, HttpRequest, RequestBody};
use crate::provider::{ApiProvider, ApiSettings, Params};
use crate::schema::Validator;

/// Characters left alone when encoding a query key or value.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Characters left alone when encoding a location. Reserved URI characters
/// and `%` survive, so existing escapes are not encoded twice.
const LOCATION: &AsciiSet = &COMPONENT
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#')
    .remove(b'%');

/// Body encoding negotiated for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Json,
    FormUrlEncoded,
    Multipart,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::FormUrlEncoded => "application/x-www-form-urlencoded",
            ContentType::Multipart => "multipart/form-data",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ready-to-send request, built fresh for each call.
#[derive(Clone)]
pub struct ResolvedRequest {
    pub url: String,
    pub method: HttpMethod,
    pub body: Option<RequestBody>,
    /// `Content-Type` merged with the provider's auth headers.
    pub headers: HeaderMap,
    pub content_type: ContentType,
    pub validator: Option<Arc<dyn Validator>>,
    pub settings: ApiSettings,
}

impl ResolvedRequest {
    pub fn to_http(&self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

impl std::fmt::Debug for ResolvedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("content_type", &self.content_type)
            .field("validated", &self.validator.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Encode `params` as a query string: `key=value` pairs joined by `&`,
/// both sides percent-encoded. Empty params encode to an empty string.
pub fn make_url_params(params: &Params) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, COMPONENT),
                utf8_percent_encode(&param_value(value), COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Text form of a parameter value. Strings are used as-is, arrays are
/// joined with commas, everything else is rendered as JSON.
pub fn param_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items.iter().map(param_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn is_absolute_url(location: &str) -> bool {
    url::Url::parse(location)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn resolve_location(provider: &dyn ApiProvider, location: &str) -> String {
    let encoded = utf8_percent_encode(location, LOCATION).to_string();
    if is_absolute_url(location) {
        encoded
    } else {
        format!("{}{}", provider.base_url(), encoded)
    }
}

/// Resolve `definition` and the caller's `data` into a concrete request.
///
/// GET requests carry the merged parameters in the query string; all other
/// methods carry them as the body, JSON-serialized unless `content_type` is
/// a form encoding.
pub fn compose(definition: &ApiDefinition, data: Option<Params>, content_type: Option<ContentType>) -> ResolvedRequest {
    let provider = definition.provider();
    let content_type = content_type.unwrap_or_default();

    let mut merged = data.unwrap_or_default();
    merged.extend(provider.base_params());

    let mut url = resolve_location(provider, definition.location());
    let body = match definition.method() {
        HttpMethod::Get => {
            let query = make_url_params(&merged);
            if !query.is_empty() {
                url.push(if definition.location().contains('?') { '&' } else { '?' });
                url.push_str(&query);
            }
            None
        }
        _ => Some(match content_type {
            ContentType::Json => RequestBody::Json(serde_json::Value::Object(merged).to_string()),
            ContentType::FormUrlEncoded => RequestBody::UrlEncoded(merged),
            ContentType::Multipart => RequestBody::Multipart(merged),
        }),
    };

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
    headers.extend(provider.auth_headers());

    ResolvedRequest {
        url,
        method: definition.method(),
        body,
        headers,
        content_type,
        validator: definition.validator().cloned(),
        settings: provider.settings(),
    }
}
