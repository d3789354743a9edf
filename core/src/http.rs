//! HTTP transport types.
//!
//! # Design
//! Requests and responses are plain data. The executor builds an
//! `HttpRequest`, hands it to a [`Transport`], and interprets the buffered
//! `HttpResponse` it gets back. Swapping the transport (a stub in tests, a
//! different client library in production) never touches the pipeline.

use async_trait::async_trait;
use ::http::header::{HeaderMap, CONTENT_TYPE};

use crate::error::{BodyError, DecodeError, TransportError};
use crate::provider::Params;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for ::http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => ::http::Method::GET,
            HttpMethod::Post => ::http::Method::POST,
            HttpMethod::Put => ::http::Method::PUT,
            HttpMethod::Delete => ::http::Method::DELETE,
            HttpMethod::Patch => ::http::Method::PATCH,
        }
    }
}

/// Request payload.
///
/// Form bodies carry the raw fields; the transport owns their encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized JSON text.
    Json(String),
    UrlEncoded(Params),
    Multipart(Params),
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

/// A fully buffered HTTP response.
///
/// `body` is `Err` when the status and headers arrived but reading the body
/// failed part way.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Result<Vec<u8>, BodyError>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Declared content type, without parameters such as `charset`.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim())
    }

    pub fn bytes(&self) -> Result<&[u8], BodyError> {
        self.body.as_deref().map_err(Clone::clone)
    }

    pub fn json(&self) -> Result<serde_json::Value, DecodeError> {
        Ok(serde_json::from_slice(self.bytes()?)?)
    }

    pub fn text(&self) -> Result<String, DecodeError> {
        Ok(String::from_utf8(self.bytes()?.to_vec())?)
    }
}

/// Issues requests on the executor's behalf.
///
/// `Err` means no response was obtained at all (connection refused, DNS,
/// TLS). Any status code, including 4xx and 5xx, is an `Ok` response, and
/// so is one whose body broke off after the headers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::http::HeaderValue;

    fn response(content_type: Option<&'static str>, body: &str) -> HttpResponse {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        HttpResponse {
            status: 200,
            headers,
            body: Ok(body.as_bytes().to_vec()),
        }
    }

    #[test]
    fn method_names_are_uppercase() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(::http::Method::from(HttpMethod::Delete), ::http::Method::DELETE);
    }

    #[test]
    fn content_type_drops_parameters() {
        let resp = response(Some("application/json; charset=utf-8"), "{}");
        assert_eq!(resp.content_type(), Some("application/json"));
        assert_eq!(response(None, "").content_type(), None);
    }

    #[test]
    fn json_and_text_decoding() {
        let resp = response(None, r#"{"a":1}"#);
        assert_eq!(resp.json().unwrap()["a"], 1);
        assert!(response(None, "not json").json().is_err());

        let invalid = HttpResponse {
            status: 400,
            headers: HeaderMap::new(),
            body: Ok(vec![0xff, 0xfe]),
        };
        assert!(matches!(invalid.text(), Err(DecodeError::Utf8(_))));
        assert!(!invalid.is_success());
    }

    #[test]
    fn truncated_body_fails_both_readers() {
        let truncated = HttpResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: Err(BodyError::new("connection closed before message completed")),
        };
        assert!(truncated.is_success());
        assert!(matches!(truncated.json(), Err(DecodeError::Body(_))));
        assert!(matches!(truncated.text(), Err(DecodeError::Body(_))));
    }
}
