//! Request and response observers.
//!
//! Each observer logs one line and hands its input back unchanged. They run
//! synchronously, once per request and once per response or failure.

use std::fmt;

use crate::error::ApiError;
use crate::http::{IncomingResponse, OutgoingRequest};

/// Log an outgoing request and return it unchanged.
pub fn on_request(request: OutgoingRequest) -> OutgoingRequest {
    tracing::info!(method = %request.method, url = %request.url, "API request");
    request
}

/// Forward a failure that happened while building the request.
///
/// Not logged here; the response-side observer logs it once.
pub fn on_request_error(error: ApiError) -> ApiError {
    error
}

/// Log a received response and return it unchanged.
pub fn on_response(response: IncomingResponse) -> IncomingResponse {
    tracing::info!(status = response.status, url = %response.url, "API response");
    response
}

/// Log a failed exchange and return the failure unchanged.
pub fn on_response_error(error: ApiError) -> ApiError {
    let info = error.info();
    tracing::error!(
        status = %OrUndefined(info.status),
        url = %OrUndefined(info.url),
        error = %info.message,
        "API error"
    );
    error
}

/// Renders `None` as `undefined`.
struct OrUndefined<T>(Option<T>);

impl<T: fmt::Display> fmt::Display for OrUndefined<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("undefined"),
        }
    }
}
