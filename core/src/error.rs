//! Error types for the API client.
//!
//! # Design
//! Every failed exchange is an `ApiError`, whether or not a response came
//! back. Callers that care tell them apart through `kind` and `status()`;
//! the observers only read the `FailureInfo` view. Configuration problems
//! are a separate `ConfigError` because they surface at construction, never
//! per call.

use std::time::Duration;

use thiserror::Error;

use crate::http::IncomingResponse;

/// Rejected `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("base URL must be absolute with a host: {0}")]
    RelativeBaseUrl(String),

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid default header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Transport(#[from] reqwest::Error),
}

/// What went wrong in an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A response arrived with a non-2xx status.
    Status,
    /// No response within the timeout.
    Timeout,
    /// Connection or I/O failure before a response arrived.
    Network,
    /// The request could not be built.
    Request,
    /// A 2xx body did not decode as the requested type.
    Decode,
}

/// A transport or HTTP failure.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub url: Option<String>,
    pub message: String,
    pub response: Option<IncomingResponse>,
}

/// Read-only view of an `ApiError` for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureInfo<'a> {
    pub status: Option<u16>,
    pub url: Option<&'a str>,
    pub message: &'a str,
}

impl ApiError {
    pub fn status(response: IncomingResponse) -> Self {
        Self {
            kind: FailureKind::Status,
            url: Some(response.url.clone()),
            message: format!("Request failed with status code {}", response.status),
            response: Some(response),
        }
    }

    pub fn timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            kind: FailureKind::Timeout,
            url: Some(url.into()),
            message: format!("timeout of {}ms exceeded", timeout.as_millis()),
            response: None,
        }
    }

    pub fn network(url: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Network,
            url: Some(url.into()),
            message: "Network Error".to_string(),
            response: None,
        }
    }

    pub fn request(url: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Request,
            url,
            message: message.into(),
            response: None,
        }
    }

    pub fn decode(response: IncomingResponse, err: &serde_json::Error) -> Self {
        Self {
            kind: FailureKind::Decode,
            url: Some(response.url.clone()),
            message: format!("failed to decode response body: {err}"),
            response: Some(response),
        }
    }

    /// Status code of the carried response, if any.
    pub fn status_code(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FailureKind::Timeout
    }

    pub fn info(&self) -> FailureInfo<'_> {
        FailureInfo {
            status: self.status_code(),
            url: self.url.as_deref(),
            message: &self.message,
        }
    }
}
