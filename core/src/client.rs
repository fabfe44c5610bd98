//! Shared HTTP client for the backend API.
//!
//! # Design
//! `ApiClient` holds an immutable `ClientConfig` and one `reqwest::Client`.
//! Cloning is cheap and every clone shares both, so a single instance can be
//! built at startup and handed to any number of concurrent callers.
//!
//! A call goes through `on_request`, the network round-trip, then
//! `on_response` or `on_response_error`. Turning an `OutgoingRequest` into a
//! `PreparedRequest` (`prepare`) is kept free of I/O so URL resolution and
//! header merging are testable on their own.

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{check_header, ClientConfig};
use crate::error::{ApiError, ConfigError};
use crate::http::{
    combine_url, merge_headers, HttpMethod, IncomingResponse, OutgoingRequest, PreparedRequest,
};
use crate::interceptors::{on_request, on_request_error, on_response, on_response_error};

/// Client bound to one base URL, timeout and set of default headers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// Client for the local development backend.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(ClientConfig::default())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Apply base URL, default headers and timeout to `request`.
    ///
    /// `Content-Type` is dropped when there is no body.
    pub fn prepare(&self, request: &OutgoingRequest) -> Result<PreparedRequest, ApiError> {
        for (name, value) in &request.headers {
            check_header(name, value).map_err(|reason| {
                ApiError::request(
                    Some(request.url.clone()),
                    format!("invalid header {name:?}: {reason}"),
                )
            })?;
        }
        if request.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ApiError::request(
                Some(request.url.clone()),
                "timeout must be greater than zero",
            ));
        }

        let mut headers = merge_headers(self.config.default_headers(), &request.headers);
        if request.body.is_none() {
            headers.retain(|(name, _)| !name.eq_ignore_ascii_case("content-type"));
        }

        Ok(PreparedRequest {
            method: request.method,
            url: combine_url(self.config.base_url(), &request.url),
            headers,
            body: request.body.clone(),
            timeout: request.timeout.unwrap_or(self.config.timeout()),
        })
    }

    /// Run `request` through the observers and the network.
    ///
    /// Non-2xx responses come back as `ApiError` carrying the response.
    pub async fn send(&self, request: OutgoingRequest) -> Result<IncomingResponse, ApiError> {
        self.dispatch(Ok(request)).await
    }

    pub async fn get(&self, path: &str) -> Result<IncomingResponse, ApiError> {
        self.send(OutgoingRequest::new(HttpMethod::Get, path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<IncomingResponse, ApiError> {
        self.send(OutgoingRequest::new(HttpMethod::Delete, path)).await
    }

    pub async fn head(&self, path: &str) -> Result<IncomingResponse, ApiError> {
        self.send(OutgoingRequest::new(HttpMethod::Head, path)).await
    }

    pub async fn options(&self, path: &str) -> Result<IncomingResponse, ApiError> {
        self.send(OutgoingRequest::new(HttpMethod::Options, path)).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<IncomingResponse, ApiError> {
        self.dispatch(json_request(HttpMethod::Post, path, body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<IncomingResponse, ApiError> {
        self.dispatch(json_request(HttpMethod::Put, path, body)).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<IncomingResponse, ApiError> {
        self.dispatch(json_request(HttpMethod::Patch, path, body)).await
    }

    /// `GET` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.get(path).await?)
    }

    /// `POST` a JSON body and decode the JSON reply.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        decode(self.post(path, body).await?)
    }

    async fn dispatch(
        &self,
        request: Result<OutgoingRequest, ApiError>,
    ) -> Result<IncomingResponse, ApiError> {
        let request = match request {
            Ok(request) => on_request(request),
            Err(err) => return Err(on_response_error(on_request_error(err))),
        };

        let prepared = self.prepare(&request).map_err(on_response_error)?;
        match self.execute(&request.url, prepared).await {
            Ok(response) if response.is_success() => Ok(on_response(response)),
            Ok(response) => Err(on_response_error(ApiError::status(response))),
            Err(err) => Err(on_response_error(err)),
        }
    }

    async fn execute(
        &self,
        url: &str,
        prepared: PreparedRequest,
    ) -> Result<IncomingResponse, ApiError> {
        let timeout = prepared.timeout;
        let mut builder = self
            .http
            .request(prepared.method.into(), &prepared.url)
            .timeout(timeout);
        for (name, value) in &prepared.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = prepared.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(url, timeout, &e))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(url, timeout, &e))?;

        Ok(IncomingResponse {
            status,
            url: url.to_string(),
            headers,
            body,
        })
    }
}

fn json_request<B: Serialize + ?Sized>(
    method: HttpMethod,
    path: &str,
    body: &B,
) -> Result<OutgoingRequest, ApiError> {
    let body = serde_json::to_string(body).map_err(|e| {
        ApiError::request(Some(path.to_string()), format!("failed to serialize body: {e}"))
    })?;
    Ok(OutgoingRequest::new(method, path).body(body))
}

fn decode<T: DeserializeOwned>(response: IncomingResponse) -> Result<T, ApiError> {
    match response.json() {
        Ok(value) => Ok(value),
        Err(e) => Err(ApiError::decode(response, &e)),
    }
}

/// Classify a reqwest failure. Network failures keep the fixed
/// `Network Error` message and log their cause at debug level.
fn transport_error(url: &str, timeout: Duration, err: &reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::timeout(url, timeout)
    } else if err.is_builder() {
        let message = match err.source() {
            Some(source) => format!("{err}: {source}"),
            None => err.to_string(),
        };
        ApiError::request(Some(url.to_string()), message)
    } else {
        tracing::debug!(url, error = %err, "transport failure");
        ApiError::network(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn client() -> ApiClient {
        ApiClient::with_defaults().unwrap()
    }

    #[test]
    fn prepare_resolves_against_base_url() {
        let req = client()
            .prepare(&OutgoingRequest::new(HttpMethod::Get, "/users"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:5001/users");
        assert_eq!(req.timeout, Duration::from_millis(30_000));
        assert!(req.body.is_none());
    }

    #[test]
    fn prepare_applies_default_content_type_to_bodies() {
        let req = client()
            .prepare(&OutgoingRequest::new(HttpMethod::Post, "/login").body("{}"))
            .unwrap();
        assert_eq!(
            req.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[test]
    fn prepare_drops_content_type_without_body() {
        let req = client()
            .prepare(&OutgoingRequest::new(HttpMethod::Get, "/users"))
            .unwrap();
        assert!(req.headers.is_empty());
    }

    #[test]
    fn prepare_call_site_overrides_win() {
        let req = client()
            .prepare(
                &OutgoingRequest::new(HttpMethod::Put, "/echo")
                    .header("content-type", "text/plain")
                    .body("hi")
                    .timeout(Duration::from_millis(250)),
            )
            .unwrap();
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "text/plain".to_string())]
        );
        assert_eq!(req.timeout, Duration::from_millis(250));
    }

    #[test]
    fn prepare_keeps_absolute_urls() {
        let req = client()
            .prepare(&OutgoingRequest::new(HttpMethod::Get, "http://127.0.0.1:9/health"))
            .unwrap();
        assert_eq!(req.url, "http://127.0.0.1:9/health");
    }

    #[test]
    fn prepare_rejects_invalid_call_site_header() {
        let err = client()
            .prepare(&OutgoingRequest::new(HttpMethod::Get, "/users").header("bad\nname", "x"))
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Request);
        assert_eq!(err.url.as_deref(), Some("/users"));
        assert!(err.message.starts_with(r#"invalid header "bad\nname": "#), "{}", err.message);
    }

    #[test]
    fn prepare_rejects_zero_timeout() {
        let err = client()
            .prepare(&OutgoingRequest::new(HttpMethod::Get, "/users").timeout(Duration::ZERO))
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Request);
    }

    #[test]
    fn json_request_serializes_body() {
        let req = json_request(HttpMethod::Post, "/login", &serde_json::json!({"username": "admin"}))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "/login");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["username"], "admin");
    }

    #[test]
    fn decode_failure_keeps_response() {
        let resp = IncomingResponse {
            status: 200,
            url: "/users".to_string(),
            headers: Vec::new(),
            body: "not json".to_string(),
        };
        let err = decode::<Vec<String>>(resp).unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
        assert_eq!(err.status_code(), Some(200));
    }

    #[test]
    fn clones_share_config() {
        let a = client();
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.config, &b.config));
    }
}
