//! Blocking client for the ExchangeRate-API v6 web service.
//!
//! # Overview
//! Builds endpoint URLs, validates currency codes against a cached list of
//! supported codes, classifies API error payloads into typed errors, and
//! decodes JSON responses into typed records.
//!
//! # Design
//! - `ExchangeRateClient` owns the supported-code cache (one hour TTL) and
//!   refreshes it lazily through the same dispatch path as every operation.
//! - The network sits behind the `Transport` trait. `UreqTransport` is the
//!   default; tests substitute scripted transports or point `ureq` at the
//!   mock server.
//! - Each operation is also split into `build_*` and `parse_*` so a caller
//!   can perform the HTTP round-trip itself.
//! - Errors are one `ApiError` enum; API-reported failures carry an
//!   `ApiErrorKind`.

pub mod cache;
pub mod classify;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod open;
pub mod types;

pub use cache::{Clock, SystemClock};
#[doc(hidden)]
pub use cache::ManualClock;
pub use client::ExchangeRateClient;
pub use config::ClientConfig;
pub use endpoint::Endpoint;
pub use error::{ApiError, ApiErrorKind};
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use open::OpenAccessClient;
pub use types::{
    ApiQuotaStatus, EnrichedData, ExchangeRates, HistoricalData, PairConversion, StandardResponse,
    SupportedCode, TargetData, UpdateTimes,
};
