//! Local echo service for exercising the client end to end.
//!
//! Serves the subset of httpbingo the client tests rely on: method echo
//! endpoints that reflect query args, headers and body back as JSON, a
//! `/status/{code}` endpoint, a bearer-protected endpoint, and an endpoint
//! that returns a broken JSON body.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, delete, get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Multi-valued string map, as used for query args, headers and forms.
pub type Multi = BTreeMap<String, Vec<String>>;

#[derive(Debug, Serialize)]
pub struct Echo {
    pub method: String,
    pub url: String,
    pub args: Multi,
    pub headers: Multi,
    #[serde(flatten)]
    pub body: Option<EchoBody>,
}

/// Present for every method that may carry a body.
#[derive(Debug, Serialize)]
pub struct EchoBody {
    /// Raw body text.
    pub data: String,
    /// Body parsed as JSON, `null` when it is not JSON.
    pub json: Option<Value>,
    pub form: Multi,
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub format: Option<String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/get", get(echo))
        .route("/post", post(echo))
        .route("/put", put(echo))
        .route("/patch", patch(echo))
        .route("/delete", delete(echo))
        .route("/anything", any(echo))
        .route("/anything/{*rest}", any(echo))
        .route("/status/{code}", any(status))
        .route("/bearer", get(bearer))
        .route("/malformed", any(malformed))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    tracing::debug!(%method, %uri, bytes = body.len(), "echo");

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let url = format!("http://{host}{uri}");
    let args = uri.query().map(parse_pairs).unwrap_or_default();

    let body = if method == Method::GET || method == Method::HEAD {
        None
    } else {
        Some(echo_body(&headers, &body))
    };

    Json(Echo {
        method: method.to_string(),
        url,
        args,
        headers: header_map(&headers),
        body,
    })
}

fn echo_body(headers: &HeaderMap, body: &[u8]) -> EchoBody {
    let data = String::from_utf8_lossy(body).into_owned();
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    EchoBody {
        json: serde_json::from_slice(body).ok(),
        form: if is_form { parse_pairs(&data) } else { Multi::new() },
        data,
    }
}

fn parse_pairs(encoded: &str) -> Multi {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(encoded).unwrap_or_default();
    let mut out = Multi::new();
    for (key, value) in pairs {
        out.entry(key).or_default().push(value);
    }
    out
}

fn header_map(headers: &HeaderMap) -> Multi {
    let mut out = Multi::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            out.entry(name.as_str().to_string()).or_default().push(value.to_string());
        }
    }
    out
}

/// Respond with the requested status. The body is the reason phrase, as
/// text by default or as `{"error": reason}` with `?format=json`.
async fn status(Path(code): Path<u16>, Query(params): Query<StatusParams>) -> Response {
    let Ok(status) = StatusCode::from_u16(code) else {
        return (StatusCode::BAD_REQUEST, "invalid status code").into_response();
    };
    if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        return status.into_response();
    }

    let reason = status.canonical_reason().unwrap_or("Unknown");
    match params.format.as_deref() {
        Some("json") => (status, Json(json!({ "error": reason }))).into_response(),
        _ => (status, reason).into_response(),
    }
}

async fn bearer(headers: HeaderMap) -> Response {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) => Json(json!({ "authenticated": true, "token": token })).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            Json(json!({ "error": "missing bearer token" })),
        )
            .into_response(),
    }
}

async fn malformed() -> Response {
    ([(header::CONTENT_TYPE, "application/json")], "{not json").into_response()
}
