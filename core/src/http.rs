//! HTTP transport types and the blocking transport seam.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`,
//! hands it to a `Transport`, and interprets the `HttpResponse` itself, so
//! status codes are never turned into errors by the transport. Tests swap in
//! a scripted transport; production uses `UreqTransport`.

use std::time::Duration;

use crate::error::ApiError;

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub timeout: Duration,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Executes a single blocking GET. Implementations must return non-2xx
/// responses as data and report timeouts as `ApiError::Timeout`.
pub trait Transport {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).get(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UreqTransport {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        // Status codes are interpreted by the classifier, not by ureq.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(request.timeout))
            .build()
            .new_agent();

        let mut response = agent.get(&request.url).call().map_err(map_ureq_error)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(map_ureq_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn map_ureq_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Timeout(_) => ApiError::Timeout,
        ureq::Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => ApiError::Timeout,
        other => ApiError::Transport(other.to_string()),
    }
}
