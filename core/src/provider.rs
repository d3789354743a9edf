//! Capability providers: where a family of requests gets its base URL,
//! default parameters, auth headers and settings.
//!
//! The executor only ever talks to [`ApiProvider`]. The concrete providers
//! here cover the common cases; downstream clients add their own by
//! implementing the trait.

use http::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

/// Caller-supplied request data and provider base parameters.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Per-provider switches applied while handling responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Promote date-like string fields to dates during normalization.
    pub coerce_dates: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self { coerce_dates: true }
    }
}

/// Configuration and authentication source for a family of requests.
///
/// Each method is called once per request, synchronously, while the request
/// is being composed.
pub trait ApiProvider: Send + Sync {
    /// Prefix for relative request locations.
    fn base_url(&self) -> String;

    /// Parameters added to every request. These override caller data on
    /// key collision.
    fn base_params(&self) -> Params {
        Params::new()
    }

    /// Headers added to every request. These override the `Content-Type`
    /// header on collision.
    fn auth_headers(&self) -> HeaderMap {
        HeaderMap::new()
    }

    fn settings(&self) -> ApiSettings {
        ApiSettings::default()
    }
}

/// A provider with no authentication and no base parameters.
#[derive(Debug, Clone)]
pub struct AnonymousProvider {
    base_url: String,
    settings: ApiSettings,
}

impl AnonymousProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            settings: ApiSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ApiSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl ApiProvider for AnonymousProvider {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    fn settings(&self) -> ApiSettings {
        self.settings
    }
}

/// Sends `Authorization: Bearer <token>` when a token is configured.
///
/// Without a token (e.g. before login) requests go out unauthenticated.
#[derive(Clone)]
pub struct BearerTokenProvider {
    base_url: String,
    token: Option<String>,
    settings: ApiSettings,
}

impl BearerTokenProvider {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
            settings: ApiSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ApiSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl std::fmt::Debug for BearerTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenProvider")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("settings", &self.settings)
            .finish()
    }
}

impl ApiProvider for BearerTokenProvider {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let Some(token) = &self.token else {
            return headers;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => {
                tracing::warn!(base_url = %self.base_url, "bearer token is not a valid header value, sending request unauthenticated");
            }
        }
        headers
    }

    fn settings(&self) -> ApiSettings {
        self.settings
    }
}

/// Provider for an OAuth authorization server.
///
/// Token and authorize calls carry their credentials in the request data, so
/// this provider adds no headers and no base parameters.
#[derive(Debug, Clone)]
pub struct OAuthProvider {
    base_url: String,
}

impl OAuthProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.base_url)
    }

    pub fn token_url(&self) -> String {
        format!("{}/token", self.base_url)
    }
}

impl ApiProvider for OAuthProvider {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_to_coercing_dates() {
        assert!(ApiSettings::default().coerce_dates);
        let parsed: ApiSettings = serde_json::from_str("{}").unwrap();
        assert!(parsed.coerce_dates);
        let parsed: ApiSettings = serde_json::from_str(r#"{"coerce_dates":false}"#).unwrap();
        assert!(!parsed.coerce_dates);
    }

    #[test]
    fn anonymous_provider_has_no_auth_or_params() {
        let provider = AnonymousProvider::new("https://api.example.com/");
        assert_eq!(provider.base_url(), "https://api.example.com/");
        assert!(provider.base_params().is_empty());
        assert!(provider.auth_headers().is_empty());
    }

    #[test]
    fn bearer_provider_sends_token() {
        let provider = BearerTokenProvider::new("https://api.example.com/", Some("abc".to_string()));
        let headers = provider.auth_headers();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn bearer_provider_without_token_sends_nothing() {
        let provider = BearerTokenProvider::new("https://api.example.com/", None);
        assert!(provider.auth_headers().is_empty());
    }

    #[test]
    fn bearer_provider_debug_redacts_token() {
        let provider = BearerTokenProvider::new("https://api.example.com/", Some("secret".to_string()));
        let printed = format!("{provider:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn bearer_provider_skips_invalid_token() {
        let provider = BearerTokenProvider::new("https://api.example.com/", Some("bad\ntoken".to_string()));
        assert!(provider.auth_headers().is_empty());
    }

    #[test]
    fn oauth_provider_endpoints() {
        let provider = OAuthProvider::new("https://zoom.us/oauth/");
        assert_eq!(provider.authorize_url(), "https://zoom.us/oauth/authorize");
        assert_eq!(provider.token_url(), "https://zoom.us/oauth/token");
        assert!(provider.auth_headers().is_empty());
        assert!(provider.base_params().is_empty());
    }
}
