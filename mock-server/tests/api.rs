use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder().method(method).uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- echo ---

#[tokio::test]
async fn get_echoes_args_as_lists() {
    let resp = app()
        .oneshot(empty_request("GET", "/get?key=value&foo=bar&foo=baz"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["method"], "GET");
    assert_eq!(body["url"], "http://localhost/get?key=value&foo=bar&foo=baz");
    assert_eq!(body["args"], json!({"key": ["value"], "foo": ["bar", "baz"]}));
    assert!(body.get("json").is_none());
}

#[tokio::test]
async fn get_echoes_request_headers() {
    let req = Request::builder()
        .uri("/get")
        .header(http::header::AUTHORIZATION, "Bearer abc")
        .body(String::new())
        .unwrap();
    let body = body_json(app().oneshot(req).await.unwrap()).await;
    assert_eq!(body["headers"]["authorization"], json!(["Bearer abc"]));
}

#[tokio::test]
async fn post_echoes_json_body() {
    let resp = app()
        .oneshot(json_request("POST", "/post", r#"{"key":"value"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["json"], json!({"key": "value"}));
    assert_eq!(body["data"], r#"{"key":"value"}"#);
    assert_eq!(body["form"], json!({}));
}

#[tokio::test]
async fn post_echoes_form_body() {
    let req = Request::builder()
        .method("POST")
        .uri("/post")
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("key=value%2Fbar&n=1".to_string())
        .unwrap();
    let body = body_json(app().oneshot(req).await.unwrap()).await;
    assert_eq!(body["json"], Value::Null);
    assert_eq!(body["form"], json!({"key": ["value/bar"], "n": ["1"]}));
}

#[tokio::test]
async fn method_endpoints_reject_other_methods() {
    let resp = app().oneshot(empty_request("GET", "/post")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn put_patch_delete_echo() {
    for (method, path) in [("PUT", "/put"), ("PATCH", "/patch"), ("DELETE", "/delete")] {
        let resp = app().oneshot(json_request(method, path, r#"{"a":1}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{method}");
        let body = body_json(resp).await;
        assert_eq!(body["method"], method);
        assert_eq!(body["json"], json!({"a": 1}));
    }
}

#[tokio::test]
async fn anything_accepts_nested_paths() {
    let resp = app()
        .oneshot(json_request("PATCH", "/anything/users/7", "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["url"], "http://localhost/anything/users/7");
}

// --- status ---

#[tokio::test]
async fn status_returns_reason_text() {
    let resp = app().oneshot(empty_request("POST", "/status/500")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let ct = resp.headers()[http::header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(ct.starts_with("text/plain"));
    assert_eq!(body_bytes(resp).await, "Internal Server Error");
}

#[tokio::test]
async fn status_returns_json_on_request() {
    let resp = app()
        .oneshot(empty_request("GET", "/status/403?format=json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await, json!({"error": "Forbidden"}));
}

#[tokio::test]
async fn status_204_has_empty_body() {
    let resp = app().oneshot(empty_request("POST", "/status/204")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn status_rejects_bad_codes() {
    let resp = app().oneshot(empty_request("GET", "/status/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app().oneshot(empty_request("GET", "/status/42")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- bearer / malformed ---

#[tokio::test]
async fn bearer_requires_token() {
    let resp = app().oneshot(empty_request("GET", "/bearer")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/bearer")
        .header(http::header::AUTHORIZATION, "Bearer secret")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"authenticated": true, "token": "secret"}));
}

#[tokio::test]
async fn malformed_claims_json_but_is_not() {
    let resp = app().oneshot(empty_request("GET", "/malformed")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "application/json");
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&bytes).is_err());
}
