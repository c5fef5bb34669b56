//! Response records returned by the exchange-rate API.
//!
//! # Design
//! Records are decoded straight from the generic JSON document with serde.
//! Unknown keys are ignored (serde's default), optional fields fall back to
//! `None`, and a missing required field surfaces as
//! `ApiError::DeserializationError` rather than as an API error.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Decode a successful response document into a typed record.
pub fn decode<T: DeserializeOwned>(document: Value) -> Result<T, ApiError> {
    serde_json::from_value(document).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Rate-table update metadata. Each field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTimes {
    #[serde(default)]
    pub time_last_update_unix: Option<i64>,
    #[serde(default)]
    pub time_last_update_utc: Option<String>,
    #[serde(default)]
    pub time_next_update_unix: Option<i64>,
    #[serde(default)]
    pub time_next_update_utc: Option<String>,
}

/// Latest rates for every supported currency against `base_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardResponse {
    pub base_code: String,
    pub conversion_rates: HashMap<String, f64>,
    #[serde(flatten)]
    pub update_times: UpdateTimes,
}

/// Rate between two currencies, with the converted amount when one was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairConversion {
    pub base_code: String,
    pub target_code: String,
    pub conversion_rate: f64,
    #[serde(default)]
    pub conversion_result: Option<f64>,
    #[serde(flatten)]
    pub update_times: UpdateTimes,
}

/// Metadata about the target currency returned by the `enriched` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetData {
    pub locale: String,
    pub two_letter_code: String,
    pub currency_name: String,
    pub currency_name_short: String,
    pub display_symbol: String,
    pub flag_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedData {
    pub base_code: String,
    pub target_code: String,
    pub conversion_rate: f64,
    pub target_data: TargetData,
    #[serde(flatten)]
    pub update_times: UpdateTimes,
}

/// Rates (or converted amounts) for a base currency on a past date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalData {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub base_code: String,
    #[serde(default)]
    pub requested_amount: Option<f64>,
    #[serde(default)]
    pub conversion_amounts: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub conversion_rates: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiQuotaStatus {
    pub plan_quota: i64,
    pub requests_remaining: i64,
    pub refresh_day_of_month: u32,
}

/// A supported currency code with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedCode {
    pub code: String,
    pub name: String,
}

/// Wire shape of the `codes` endpoint: `[[code, name], ...]`.
#[derive(Debug, Deserialize)]
pub(crate) struct SupportedCodesResponse {
    pub supported_codes: Vec<(String, String)>,
}

impl SupportedCodesResponse {
    pub fn into_codes(self) -> Vec<SupportedCode> {
        self.supported_codes
            .into_iter()
            .map(|(code, name)| SupportedCode { code, name })
            .collect()
    }
}

/// Rates from the open-access endpoint (no API key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub base_code: String,
    pub rates: HashMap<String, f64>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(flatten)]
    pub update_times: UpdateTimes,
}
