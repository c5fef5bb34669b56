//! Client for the open-access endpoint, which needs no API key.
//!
//! The open endpoint may answer with a 2xx status and `"result": "error"`,
//! so both the status and the `result` field decide success.

use serde_json::Value;

use crate::classify::{classify_error, is_success, parse_document};
use crate::config::{DEFAULT_OPEN_API_ROOT, DEFAULT_TIMEOUT};
use crate::error::{ApiError, ApiErrorKind};
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::{decode, ExchangeRates};

const OPEN_HANDLERS: &[ApiErrorKind] = &[ApiErrorKind::UnsupportedCode, ApiErrorKind::MalformedRequest];

pub struct OpenAccessClient<T: Transport = UreqTransport> {
    api_root: String,
    transport: T,
}

impl OpenAccessClient<UreqTransport> {
    pub fn new() -> Self {
        Self::with_transport(DEFAULT_OPEN_API_ROOT, UreqTransport::new())
    }
}

impl Default for OpenAccessClient<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> OpenAccessClient<T> {
    pub fn with_transport(api_root: &str, transport: T) -> Self {
        Self {
            api_root: api_root.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn build_exchange_rates(&self, base_code: &str) -> HttpRequest {
        HttpRequest {
            url: format!("{}/latest/{base_code}", self.api_root),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn parse_exchange_rates(&self, response: HttpResponse) -> Result<ExchangeRates, ApiError> {
        let document = match parse_document(&response.body) {
            Ok(document) => document,
            Err(_) if !is_success(response.status) => {
                return Err(ApiError::UnknownError {
                    status: response.status,
                })
            }
            Err(e) => return Err(e),
        };
        let reported_error = document.get("result").and_then(Value::as_str) == Some("error");
        if !is_success(response.status) || reported_error {
            let err = classify_error(OPEN_HANDLERS, response.status, &document);
            tracing::warn!(status = response.status, error = %err, "open-access request failed");
            return Err(err);
        }
        decode(document)
    }

    /// Latest rates against `base_code`. No code validation is performed;
    /// the server answers unknown codes with `unsupported-code`.
    pub fn fetch_exchange_rates(&self, base_code: &str) -> Result<ExchangeRates, ApiError> {
        let request = self.build_exchange_rates(base_code);
        let response = self.transport.get(&request)?;
        tracing::debug!(status = response.status, "received open-access response");
        self.parse_exchange_rates(response)
    }
}
