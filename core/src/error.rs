//! Transport and response body error types.
//!
//! # Design
//! A `TransportError` means no HTTP response was obtained. Anything that
//! produced a status code, including 4xx and 5xx, is not a transport error
//! and is classified by the executor instead. A body that breaks off after
//! the status line is a [`BodyError`] carried inside the response, so the
//! status is never lost.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Underlying HTTP client error (connect, DNS, TLS, body stream).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection failure reported by a transport without a richer type.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request body could not be encoded for the wire.
    #[error("Failed to encode request body: {0}")]
    Encode(String),
}

/// The status line and headers arrived but the body could not be read to
/// the end (connection reset, truncated content, broken chunking).
#[derive(Debug, Clone, Error)]
#[error("failed to read response body: {0}")]
pub struct BodyError(String);

impl BodyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<reqwest::Error> for BodyError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}

/// A response body that could not be turned into JSON or text.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Body(#[from] BodyError),

    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl TransportError {
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connection(_)) || matches!(self, Self::Http(e) if e.is_connect())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_are_connect() {
        let err = TransportError::Connection("refused".to_string());
        assert!(err.is_connect());
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "Connection error: refused");
    }

    #[test]
    fn body_errors_decode_transparently() {
        let err = DecodeError::from(BodyError::new("connection reset"));
        assert_eq!(err.to_string(), "failed to read response body: connection reset");
        assert!(matches!(err, DecodeError::Body(_)));
    }

    #[test]
    fn encode_errors_are_not_connect() {
        let err = TransportError::Encode("nested value".to_string());
        assert!(!err.is_connect());
    }
}
