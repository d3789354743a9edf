//! Classification of error responses.
//!
//! Any response outside 200..=299 becomes an [`ApiFailure`] with a fixed
//! message per status. For the well-known statuses the error body is kept
//! as the failure cause, read according to the declared content type.

use crate::compose::ResolvedRequest;
use crate::http::HttpResponse;
use crate::outcome::{ApiFailure, FailureCause};
use crate::value::ApiValue;

/// Fixed message for a well-known error status.
pub fn status_message(status: u16) -> Option<&'static str> {
    match status {
        400 => Some("Bad Request"),
        401 => Some("Unauthorized for this user"),
        403 => Some("Forbidden for this user"),
        404 => Some("Not Found"),
        500 => Some("Internal Server Error"),
        _ => None,
    }
}

/// Build the failure for a non-2xx `response`.
pub fn classify(request: &ResolvedRequest, response: &HttpResponse) -> ApiFailure {
    let status = response.status;
    match status_message(status) {
        Some(message) => ApiFailure::new(request, status, message, FailureCause::Body(error_body(response))),
        None => ApiFailure::new(
            request,
            status,
            format!("Failed call with response {status}"),
            FailureCause::Body(ApiValue::empty_object()),
        ),
    }
}

/// JSON bodies are decoded, anything else is kept as text. A body that
/// cannot be read either way becomes an empty object.
fn error_body(response: &HttpResponse) -> ApiValue {
    let is_json = response
        .content_type()
        .is_some_and(|ct| ct.eq_ignore_ascii_case("application/json"));

    if is_json {
        match response.json() {
            Ok(body) => ApiValue::from(body),
            Err(e) => {
                tracing::debug!(status = response.status, error = %e, "error body is not readable JSON");
                ApiValue::empty_object()
            }
        }
    } else {
        match response.text() {
            Ok(body) => ApiValue::String(body),
            Err(e) => {
                tracing::debug!(status = response.status, error = %e, "error body is not readable text");
                ApiValue::empty_object()
            }
        }
    }
}
