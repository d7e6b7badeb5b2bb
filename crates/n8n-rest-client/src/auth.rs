//! Authentication methods for the REST API client

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use std::fmt;

/// Header carrying the n8n public API key
pub const API_KEY_HEADER: &str = "x-n8n-api-key";

/// Authentication methods supported by the API
#[derive(Clone, Default)]
pub enum AuthMethod {
    /// Public API key (`X-N8N-API-KEY: <key>`)
    ApiKey(String),
    /// No authentication
    #[default]
    None,
}

// Keys end up in `Debug` output of the client, so they are redacted.
impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::ApiKey(_) => f.write_str("ApiKey(***)"),
            AuthMethod::None => f.write_str("None"),
        }
    }
}

impl AuthMethod {
    /// Apply authentication headers to a request
    pub fn apply_to_headers(&self, headers: &mut HeaderMap) -> Result<(), InvalidHeaderValue> {
        match self {
            AuthMethod::ApiKey(key) => {
                let mut value = HeaderValue::from_str(key)?;
                value.set_sensitive(true);
                headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
            }
            AuthMethod::None => {}
        }
        Ok(())
    }

    /// Create API key authentication from a key string
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }
}

/// Authentication configuration for the client
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub method: AuthMethod,
}

impl AuthConfig {
    /// Create a new auth config with API key authentication
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::api_key(key),
        }
    }

    /// Get headers for this authentication configuration
    pub fn headers(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        self.method.apply_to_headers(&mut headers)?;
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_auth_headers() {
        let auth = AuthMethod::api_key("test-key");
        let mut headers = HeaderMap::new();
        auth.apply_to_headers(&mut headers).unwrap();

        assert_eq!(headers.get("x-n8n-api-key").unwrap(), "test-key");
        assert!(headers.get("authorization").is_none());
    }

    #[test]
    fn test_no_auth_headers() {
        let headers = AuthConfig::default().headers().unwrap();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let config = AuthConfig::with_api_key("bad\nkey");
        assert!(config.headers().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig::with_api_key("super-secret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
    }
}
