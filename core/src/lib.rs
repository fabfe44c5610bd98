//! Shared HTTP client for the backend API.
//!
//! # Overview
//! One `ApiClient` is configured with a base URL, a timeout and default
//! headers, then shared by every caller. Each call passes through a request
//! observer and a response observer that log the exchange with `tracing` and
//! return their input unchanged.
//!
//! # Design
//! - `ClientConfig` is validated at construction and never mutated.
//! - `OutgoingRequest` / `IncomingResponse` are plain data, so observers and
//!   request preparation are testable without a network.
//! - Every failed exchange is an `ApiError`; whether a response came back is
//!   visible through `ApiError::status_code`.
//! - The library never installs a tracing subscriber.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptors;

pub use client::ApiClient;
pub use config::{ClientConfig, ClientConfigBuilder, API_BASE_URL, DEFAULT_TIMEOUT_MS};
pub use error::{ApiError, ConfigError, FailureInfo, FailureKind};
pub use http::{HttpMethod, IncomingResponse, OutgoingRequest, PreparedRequest};
