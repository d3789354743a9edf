//! Default [`Transport`] backed by `reqwest`.

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use reqwest::multipart;

use crate::compose::param_value;
use crate::error::{BodyError, TransportError};
use crate::http::{HttpRequest, HttpResponse, RequestBody, Transport};

/// Sends requests with a `reqwest::Client` and buffers the whole body.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxies, TLS roots, default headers).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut headers = request.headers;
        let builder = self.client.request(request.method.into(), &request.url);

        let builder = match request.body {
            None => builder.headers(headers),
            Some(RequestBody::Json(body)) => builder.headers(headers).body(body),
            Some(RequestBody::UrlEncoded(fields)) => {
                // reqwest sets the form content type itself.
                headers.remove(CONTENT_TYPE);
                let pairs: Vec<(String, String)> = fields.iter().map(|(k, v)| (k.clone(), param_value(v))).collect();
                let encoded = serde_urlencoded::to_string(&pairs).map_err(|e| TransportError::Encode(e.to_string()))?;
                builder
                    .headers(headers)
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(encoded)
            }
            Some(RequestBody::Multipart(fields)) => {
                // The boundary parameter is only known once the form is built.
                headers.remove(CONTENT_TYPE);
                let form = fields
                    .iter()
                    .fold(multipart::Form::new(), |form, (k, v)| form.text(k.clone(), param_value(v)));
                builder.headers(headers).multipart(form)
            }
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        // The status has arrived; from here on a failure belongs to the body.
        let body = response.bytes().await.map(|b| b.to_vec()).map_err(BodyError::from);
        if let Err(e) = &body {
            tracing::debug!(status, error = %e, "response body could not be read");
        }

        Ok(HttpResponse { status, headers, body })
    }
}
