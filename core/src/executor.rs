//! Transport executor.
//!
//! # Design
//! `Executor` holds a [`Transport`] and an [`ExecutorConfig`] and nothing
//! else, so one executor can serve any number of concurrent calls. Each call
//! composes a request, sends it once, and turns whatever comes back into an
//! [`ApiResult`]:
//!
//! - no response: failure with status 0;
//! - 204: success with an empty object, skipping normalization and schema;
//! - other 2xx: decode, normalize, unwrap the envelope, validate;
//! - anything else: [`classify`].
//!
//! Failures built at one stage are returned as-is; no later stage wraps
//! them again.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::compose::{compose, ContentType, ResolvedRequest};
use crate::config::ExecutorConfig;
use crate::definition::ApiDefinition;
use crate::http::{HttpResponse, Transport};
use crate::normalize::normalize;
use crate::outcome::{ApiFailure, ApiResult, ApiSuccess, FailureCause};
use crate::provider::Params;
use crate::transport::ReqwestTransport;
use crate::value::ApiValue;

/// Envelope fields that wrap the real payload, in lookup order.
const ENVELOPE_KEYS: [&str; 3] = ["json", "data", "Data"];

#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            config: ExecutorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Compose `definition` with `data` and run the call.
    ///
    /// `content_type` defaults to JSON.
    pub async fn execute(
        &self,
        definition: &ApiDefinition,
        data: Option<Params>,
        content_type: Option<ContentType>,
    ) -> ApiResult {
        let request = compose(definition, data, content_type);
        self.execute_request(&request).await
    }

    /// Run an already composed request.
    pub async fn execute_request(&self, request: &ResolvedRequest) -> ApiResult {
        info!(method = %request.method, url = %request.url, "fetching");
        if self.config.debug {
            debug!(request = ?request, "resolved request");
        }

        let response = match self.transport.send(request.to_http()).await {
            Ok(response) => response,
            Err(e) => {
                return Err(self.failed(ApiFailure::new(
                    request,
                    0,
                    "API Call failed",
                    FailureCause::Transport(e),
                )));
            }
        };

        if self.config.debug {
            debug!(status = response.status, headers = ?response.headers, "response received");
        }

        let status = response.status;
        match status {
            204 => Ok(ApiSuccess {
                method: request.method,
                http_status: 204,
                url: request.url.clone(),
                headers: response.headers,
                data: ApiValue::empty_object(),
            }),
            _ if response.is_success() => self.handle_success(request, response),
            _ => Err(self.failed(classify(request, &response))),
        }
    }

    fn handle_success(&self, request: &ResolvedRequest, response: HttpResponse) -> ApiResult {
        let decoded = match response.json() {
            Ok(decoded) => decoded,
            Err(e) => {
                return Err(self.failed(ApiFailure::new(
                    request,
                    response.status,
                    "Failed to handle API Response",
                    FailureCause::Decode(e),
                )));
            }
        };

        let data = extract_data_block(normalize(ApiValue::from(decoded), &request.settings));

        let data = match &request.validator {
            None => data,
            Some(validator) => match validator.parse(data) {
                Ok(validated) => validated,
                Err(e) => {
                    if self.config.debug {
                        debug!(url = %request.url, issues = ?e.issues, "validation failed");
                    }
                    return Err(self.failed(ApiFailure::new(
                        request,
                        response.status,
                        "Validation failed",
                        FailureCause::Validation(e),
                    )));
                }
            },
        };

        Ok(ApiSuccess {
            method: request.method,
            http_status: response.status,
            url: request.url.clone(),
            headers: response.headers,
            data,
        })
    }

    fn failed(&self, failure: ApiFailure) -> ApiFailure {
        warn!(
            method = %failure.method,
            url = %failure.url,
            status = failure.http_status,
            error = %failure.error,
            "{}",
            failure.error_message
        );
        failure
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(ReqwestTransport::new())
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Unwrap envelope-style responses: the first present, non-null `json`,
/// `data` or `Data` field, else the whole value.
fn extract_data_block(value: ApiValue) -> ApiValue {
    match value {
        ApiValue::Object(mut map) => {
            let key = ENVELOPE_KEYS
                .iter()
                .find(|key| map.get(**key).is_some_and(|v| !v.is_absent()));
            match key.and_then(|key| map.remove(*key)) {
                Some(inner) => inner,
                None => ApiValue::Object(map),
            }
        }
        other => other,
    }
}
