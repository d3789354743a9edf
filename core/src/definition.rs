//! Request definitions.
//!
//! An `ApiDefinition` declares an operation once (provider, location,
//! method, optional schema) and is reused for every call. Definitions are
//! values: attaching a schema produces a new definition and leaves the
//! original as it was.

use std::sync::Arc;

use crate::http::HttpMethod;
use crate::provider::ApiProvider;
use crate::schema::Validator;

#[derive(Clone)]
pub struct ApiDefinition {
    provider: Arc<dyn ApiProvider>,
    location: String,
    method: HttpMethod,
    validator: Option<Arc<dyn Validator>>,
}

impl ApiDefinition {
    pub fn new(method: HttpMethod, provider: Arc<dyn ApiProvider>, location: impl Into<String>) -> Self {
        Self {
            provider,
            location: location.into(),
            method,
            validator: None,
        }
    }

    pub fn get(provider: Arc<dyn ApiProvider>, location: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, provider, location)
    }

    pub fn put(provider: Arc<dyn ApiProvider>, location: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, provider, location)
    }

    pub fn post(provider: Arc<dyn ApiProvider>, location: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, provider, location)
    }

    pub fn delete(provider: Arc<dyn ApiProvider>, location: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, provider, location)
    }

    pub fn patch(provider: Arc<dyn ApiProvider>, location: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, provider, location)
    }

    /// A copy of this definition whose responses are checked by `validator`.
    pub fn with_validator(&self, validator: impl Validator + 'static) -> Self {
        self.with_shared_validator(Arc::new(validator))
    }

    /// Like [`with_validator`](Self::with_validator), for a validator shared
    /// between definitions.
    pub fn with_shared_validator(&self, validator: Arc<dyn Validator>) -> Self {
        Self {
            validator: Some(validator),
            ..self.clone()
        }
    }

    pub fn provider(&self) -> &dyn ApiProvider {
        self.provider.as_ref()
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn validator(&self) -> Option<&Arc<dyn Validator>> {
        self.validator.as_ref()
    }
}

impl std::fmt::Debug for ApiDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiDefinition")
            .field("method", &self.method)
            .field("location", &self.location)
            .field("base_url", &self.provider.base_url())
            .field("validated", &self.validator.is_some())
            .finish()
    }
}
