//! Call outcomes.
//!
//! # Design
//! Every call ends in exactly one of [`ApiSuccess`] or [`ApiFailure`],
//! delivered as `Result<ApiSuccess, ApiFailure>`. All failure kinds share one
//! shape. Callers tell them apart by `http_status` (0 means no response was
//! received) and by the [`FailureCause`] variant.

use http::HeaderMap;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::compose::ResolvedRequest;
use crate::error::{DecodeError, TransportError};
use crate::http::HttpMethod;
use crate::schema::ValidationError;
use crate::value::ApiValue;

pub type ApiResult = Result<ApiSuccess, ApiFailure>;

#[derive(Debug, Clone)]
pub struct ApiSuccess {
    pub method: HttpMethod,
    pub http_status: u16,
    pub url: String,
    /// Response headers.
    pub headers: HeaderMap,
    /// Normalized payload, after validation when a schema was attached.
    pub data: ApiValue,
}

impl ApiSuccess {
    /// Deserialize the payload into a caller type. Dates are presented as
    /// RFC 3339 strings, undefined fields as missing.
    pub fn deserialize_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.to_json())
    }
}

/// Why a call failed.
#[derive(Debug, Error)]
pub enum FailureCause {
    /// No response was obtained.
    #[error(transparent)]
    Transport(TransportError),

    /// A 2xx response whose body could not be read or was not JSON.
    #[error(transparent)]
    Decode(DecodeError),

    /// The payload was rejected by the attached schema.
    #[error(transparent)]
    Validation(ValidationError),

    /// The body of an error response: decoded JSON, raw text, or an empty
    /// object when the body could not be read.
    #[error("error response body")]
    Body(ApiValue),
}

impl FailureCause {
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            FailureCause::Validation(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_body(&self) -> Option<&ApiValue> {
        match self {
            FailureCause::Body(body) => Some(body),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
#[error("{error_message} ({method} {url}, HTTP {http_status})")]
pub struct ApiFailure {
    /// Fixed human-readable summary, never empty.
    pub error_message: String,
    #[source]
    pub error: FailureCause,
    pub method: HttpMethod,
    /// Response status, or 0 when no response was received.
    pub http_status: u16,
    pub url: String,
    /// Headers the request was sent with.
    pub headers: HeaderMap,
}

impl ApiFailure {
    pub(crate) fn new(
        request: &ResolvedRequest,
        http_status: u16,
        error_message: impl Into<String>,
        error: FailureCause,
    ) -> Self {
        Self {
            error_message: error_message.into(),
            error,
            method: request.method,
            http_status,
            url: request.url.clone(),
            headers: request.headers.clone(),
        }
    }

    /// True when the call never got a response.
    pub fn is_transport_failure(&self) -> bool {
        self.http_status == 0
    }
}
