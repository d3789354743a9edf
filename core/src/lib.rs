//! Request execution layer for JSON-over-HTTP APIs.
//!
//! # Overview
//! An [`ApiDefinition`] names a provider, a location and a method. Calling
//! [`Executor::execute`] with optional parameters composes the request,
//! sends it through a [`Transport`], and returns an [`ApiResult`]: either an
//! [`ApiSuccess`] with the normalized payload or an [`ApiFailure`] carrying
//! the status, a fixed message and the cause.
//!
//! # Design
//! - Definitions and providers are immutable and shared through `Arc`, so
//!   concurrent calls never observe each other.
//! - Composition ([`compose`]) is pure. All I/O lives behind [`Transport`];
//!   tests swap in a canned transport, production uses [`ReqwestTransport`].
//! - Response payloads become [`ApiValue`] trees. Fields whose names look
//!   like dates are coerced to timestamps before any schema runs.
//! - Schemas plug in through the [`Validator`] trait. [`Schema`] covers the
//!   common object/array/scalar shapes.

pub mod classify;
pub mod compose;
pub mod config;
pub mod definition;
pub mod error;
pub mod executor;
pub mod http;
pub mod normalize;
pub mod outcome;
pub mod provider;
pub mod schema;
pub mod transport;
pub mod value;

pub use self::compose::{compose, ContentType, ResolvedRequest};
pub use self::config::ExecutorConfig;
pub use self::definition::ApiDefinition;
pub use self::error::{BodyError, DecodeError, TransportError};
pub use self::executor::Executor;
pub use self::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport};
pub use self::outcome::{ApiFailure, ApiResult, ApiSuccess, FailureCause};
pub use self::provider::{AnonymousProvider, ApiProvider, ApiSettings, BearerTokenProvider, OAuthProvider, Params};
pub use self::schema::{IssueCode, ObjectSchema, Schema, ValidationError, ValidationIssue, Validator};
pub use self::transport::ReqwestTransport;
pub use self::value::ApiValue;
