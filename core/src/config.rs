//! Client configuration.
//!
//! # Design
//! `ClientConfig` is validated once in `ClientConfigBuilder::build` and is
//! immutable afterwards. The defaults describe the local development backend;
//! anything else goes through the builder.

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use crate::error::ConfigError;

/// Base URL of the local development backend.
pub const API_BASE_URL: &str = "http://localhost:5001";

/// Request timeout applied when a call does not set its own.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Validated settings shared by every call made through one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
    default_headers: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            default_headers: json_content_type(),
        }
    }
}

fn json_content_type() -> Vec<(String, String)> {
    vec![("Content-Type".to_string(), "application/json".to_string())]
}

/// Builder for `ClientConfig`. Starts from the development defaults.
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    base_url: String,
    timeout: Duration,
    default_headers: Vec<(String, String)>,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            default_headers: json_content_type(),
        }
    }
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout_millis(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    /// Add or replace a default header (name compared case-insensitively).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        self.default_headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.default_headers.push((name, value));
        self
    }

    /// Drop all default headers, including `Content-Type`.
    pub fn clear_headers(mut self) -> Self {
        self.default_headers.clear();
        self
    }

    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let base_url = Url::parse(&self.base_url)?;
        if !base_url.has_host() {
            return Err(ConfigError::RelativeBaseUrl(self.base_url));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        for (name, value) in &self.default_headers {
            check_header(name, value).map_err(|reason| ConfigError::InvalidHeader {
                name: name.clone(),
                reason,
            })?;
        }
        Ok(ClientConfig {
            base_url: self.base_url,
            timeout: self.timeout,
            default_headers: self.default_headers,
        })
    }
}

/// Reason `name: value` is not a valid HTTP header, if it is not.
pub(crate) fn check_header(name: &str, value: &str) -> Result<(), String> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| e.to_string())?;
    HeaderValue::from_str(value).map_err(|e| e.to_string())?;
    Ok(())
}
