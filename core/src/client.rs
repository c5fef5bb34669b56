//! Blocking client for the account-scoped exchange-rate API.
//!
//! # Design
//! Every operation follows the same path: validate local arguments (which
//! may consult the supported-code cache), build the request, dispatch it
//! through the `Transport`, classify the response against the endpoint's
//! handler list, then decode the typed record. Each step is also exposed on
//! its own as a `build_*` / `parse_*` pair so a caller can drive the I/O.
//!
//! The supported-code cache lives on the client and is refreshed lazily
//! through the same dispatch path, so an operation performs at most two
//! round-trips. Operations that may refresh the cache take `&mut self`.
//! Nothing is retried.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use crate::cache::{Clock, CodeCache, SystemClock};
use crate::classify::check_response;
use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::{
    decode, ApiQuotaStatus, EnrichedData, HistoricalData, PairConversion, StandardResponse,
    SupportedCode, SupportedCodesResponse,
};

/// Client for the v6 exchange-rate API, scoped to one API key.
pub struct ExchangeRateClient<T: Transport = UreqTransport> {
    config: ClientConfig,
    transport: T,
    clock: Arc<dyn Clock>,
    cache: CodeCache,
}

impl ExchangeRateClient<UreqTransport> {
    /// Client against the public API with the default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_transport(ClientConfig::new(api_key), UreqTransport::new())
    }
}

impl<T: Transport> ExchangeRateClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let cache = CodeCache::new(config.cache_ttl());
        Self {
            config,
            transport,
            clock: Arc::new(SystemClock),
            cache,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_standard_response(&self, base_code: &str) -> HttpRequest {
        self.config
            .request(Endpoint::Latest, &[Some(base_code.to_string())])
    }

    pub fn build_pair_conversion(
        &self,
        base_code: &str,
        target_code: &str,
        amount: Option<f64>,
    ) -> HttpRequest {
        self.config.request(
            Endpoint::Pair,
            &[
                Some(base_code.to_string()),
                Some(target_code.to_string()),
                amount.map(|a| a.to_string()),
            ],
        )
    }

    pub fn build_enriched_data(&self, base_code: &str, target_code: &str) -> HttpRequest {
        self.config.request(
            Endpoint::Enriched,
            &[Some(base_code.to_string()), Some(target_code.to_string())],
        )
    }

    pub fn build_historical_data(&self, base_code: &str, date: NaiveDate, amount: f64) -> HttpRequest {
        self.config.request(
            Endpoint::History,
            &[
                Some(base_code.to_string()),
                Some(date.year().to_string()),
                Some(date.month().to_string()),
                Some(date.day().to_string()),
                Some(amount.to_string()),
            ],
        )
    }

    pub fn build_quota_info(&self) -> HttpRequest {
        self.config.request(Endpoint::Quota, &[])
    }

    pub fn build_supported_codes(&self) -> HttpRequest {
        self.config.request(Endpoint::Codes, &[])
    }

    // -----------------------------------------------------------------------
    // Response parsers
    // -----------------------------------------------------------------------

    pub fn parse_standard_response(&self, response: HttpResponse) -> Result<StandardResponse, ApiError> {
        decode(checked(Endpoint::Latest, &response)?)
    }

    pub fn parse_pair_conversion(&self, response: HttpResponse) -> Result<PairConversion, ApiError> {
        decode(checked(Endpoint::Pair, &response)?)
    }

    pub fn parse_enriched_data(&self, response: HttpResponse) -> Result<EnrichedData, ApiError> {
        decode(checked(Endpoint::Enriched, &response)?)
    }

    pub fn parse_historical_data(&self, response: HttpResponse) -> Result<HistoricalData, ApiError> {
        decode(checked(Endpoint::History, &response)?)
    }

    pub fn parse_quota_info(&self, response: HttpResponse) -> Result<ApiQuotaStatus, ApiError> {
        decode(checked(Endpoint::Quota, &response)?)
    }

    pub fn parse_supported_codes(&self, response: HttpResponse) -> Result<Vec<SupportedCode>, ApiError> {
        let codes: SupportedCodesResponse = decode(checked(Endpoint::Codes, &response)?)?;
        Ok(codes.into_codes())
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Latest rates for every supported currency against `base_code`.
    pub fn fetch_standard_response(&mut self, base_code: &str) -> Result<StandardResponse, ApiError> {
        self.ensure_supported(base_code)?;
        let request = self.build_standard_response(base_code);
        decode(dispatch(&self.transport, Endpoint::Latest, &request)?)
    }

    /// Rate from `base_code` to `target_code`, converting `amount` when given.
    ///
    /// A negative amount is rejected before any request is sent.
    pub fn pair_conversion(
        &mut self,
        base_code: &str,
        target_code: &str,
        amount: Option<f64>,
    ) -> Result<PairConversion, ApiError> {
        if let Some(amount) = amount {
            validate_amount(amount)?;
        }
        self.ensure_supported(base_code)?;
        self.ensure_supported(target_code)?;
        let request = self.build_pair_conversion(base_code, target_code, amount);
        decode(dispatch(&self.transport, Endpoint::Pair, &request)?)
    }

    pub fn fetch_enriched_data(
        &mut self,
        base_code: &str,
        target_code: &str,
    ) -> Result<EnrichedData, ApiError> {
        self.ensure_supported(base_code)?;
        self.ensure_supported(target_code)?;
        let request = self.build_enriched_data(base_code, target_code);
        decode(dispatch(&self.transport, Endpoint::Enriched, &request)?)
    }

    /// Amounts converted from `base_code` at the rates of `date`.
    pub fn fetch_historical_data(
        &mut self,
        base_code: &str,
        date: NaiveDate,
        amount: f64,
    ) -> Result<HistoricalData, ApiError> {
        validate_amount(amount)?;
        self.ensure_supported(base_code)?;
        let request = self.build_historical_data(base_code, date, amount);
        decode(dispatch(&self.transport, Endpoint::History, &request)?)
    }

    pub fn fetch_quota_info(&self) -> Result<ApiQuotaStatus, ApiError> {
        let request = self.build_quota_info();
        decode(dispatch(&self.transport, Endpoint::Quota, &request)?)
    }

    /// Fetch the supported-code list. Also refreshes the code cache.
    pub fn fetch_supported_codes(&mut self) -> Result<Vec<SupportedCode>, ApiError> {
        let codes = fetch_codes(&self.config, &self.transport)?;
        let set = codes.iter().map(|c| c.code.clone()).collect();
        self.cache.replace(set, self.clock.now());
        Ok(codes)
    }

    /// Case-sensitive membership in the cached code set, refreshing it when
    /// it is empty or older than the TTL.
    pub fn is_supported_code(&mut self, code: &str) -> Result<bool, ApiError> {
        let now = self.clock.now();
        let config = &self.config;
        let transport = &self.transport;
        self.cache.contains(code, now, || {
            let codes = fetch_codes(config, transport)?;
            Ok(codes.into_iter().map(|c| c.code).collect::<HashSet<_>>())
        })
    }

    fn ensure_supported(&mut self, code: &str) -> Result<(), ApiError> {
        if !self.is_supported_code(code)? {
            tracing::debug!(code, "rejected unsupported currency code");
            return Err(ApiError::UnsupportedCode(code.to_string()));
        }
        Ok(())
    }
}

fn validate_amount(amount: f64) -> Result<(), ApiError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ApiError::InvalidArgument(format!(
            "amount must be greater than or equal to 0, got {amount}"
        )));
    }
    Ok(())
}

fn fetch_codes<T: Transport>(config: &ClientConfig, transport: &T) -> Result<Vec<SupportedCode>, ApiError> {
    let request = config.request(Endpoint::Codes, &[]);
    let codes: SupportedCodesResponse = decode(dispatch(transport, Endpoint::Codes, &request)?)?;
    Ok(codes.into_codes())
}

/// Send `request` and classify the response for `endpoint`.
fn dispatch<T: Transport>(
    transport: &T,
    endpoint: Endpoint,
    request: &HttpRequest,
) -> Result<Value, ApiError> {
    let response = transport
        .get(request)
        .inspect_err(|e| tracing::warn!(%endpoint, error = %e, "request did not complete"))?;
    tracing::debug!(%endpoint, status = response.status, "received response");
    checked(endpoint, &response)
}

fn checked(endpoint: Endpoint, response: &HttpResponse) -> Result<Value, ApiError> {
    check_response(endpoint.handlers(), response).inspect_err(|e| {
        tracing::warn!(%endpoint, status = response.status, error = %e, "request failed")
    })
}
