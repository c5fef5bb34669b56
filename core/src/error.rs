//! Error types for the exchange-rate API client.
//!
//! # Design
//! Failures fall into four groups: local argument validation (raised before
//! any request is sent), transport failures, API errors the service reports
//! through its `error-type` field, and everything the client could not
//! classify. API errors are a closed set so callers can match on
//! `ApiErrorKind` without string comparisons.

use thiserror::Error;

/// Error kinds the exchange-rate API reports through the `error-type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    UnsupportedCode,
    MalformedRequest,
    InvalidKey,
    InactiveAccount,
    QuotaReached,
    PlanUpgradeRequired,
    NoDataAvailable,
}

impl ApiErrorKind {
    /// The `error-type` string the API uses for this kind.
    pub fn error_type(self) -> &'static str {
        match self {
            ApiErrorKind::UnsupportedCode => "unsupported-code",
            ApiErrorKind::MalformedRequest => "malformed-request",
            ApiErrorKind::InvalidKey => "invalid-key",
            ApiErrorKind::InactiveAccount => "inactive-account",
            ApiErrorKind::QuotaReached => "quota-reached",
            ApiErrorKind::PlanUpgradeRequired => "plan-upgrade-required",
            ApiErrorKind::NoDataAvailable => "no-data-available",
        }
    }

    fn message(self) -> &'static str {
        match self {
            ApiErrorKind::UnsupportedCode => "one or both of the supplied codes are not supported",
            ApiErrorKind::MalformedRequest => "the request was not structured correctly",
            ApiErrorKind::InvalidKey => "the API key is not valid",
            ApiErrorKind::InactiveAccount => "the account's email address was not confirmed",
            ApiErrorKind::QuotaReached => "reached the number of requests allowed by the plan",
            ApiErrorKind::PlanUpgradeRequired => "the plan does not support this endpoint",
            ApiErrorKind::NoDataAvailable => "no data is available for the requested date",
        }
    }
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Errors returned by the exchange-rate clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The code is not in the cached supported-code set. No request was sent.
    #[error("currency code {0} is not supported")]
    UnsupportedCode(String),

    /// A local argument was rejected before dispatch.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The API reported a recognised `error-type`.
    #[error("{0}")]
    Api(ApiErrorKind),

    /// The API reported an `error-type` this endpoint does not recognise.
    #[error("unexpected error type: {0}")]
    UnexpectedErrorType(String),

    /// Non-2xx status without an `error-type` field.
    #[error("unknown error occurred (HTTP {status})")]
    UnknownError { status: u16 },

    #[error("the request to the exchange rate API timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    /// The body was not JSON or lacked a required field.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

impl ApiError {
    /// The API error kind, if any. Local unsupported-code rejections report
    /// `UnsupportedCode` just like the remote one.
    pub fn kind(&self) -> Option<ApiErrorKind> {
        match self {
            ApiError::Api(kind) => Some(*kind),
            ApiError::UnsupportedCode(_) => Some(ApiErrorKind::UnsupportedCode),
            _ => None,
        }
    }

    /// True for failing responses the classifier could not map to a kind.
    pub fn is_unclassified(&self) -> bool {
        matches!(
            self,
            ApiError::UnexpectedErrorType(_) | ApiError::UnknownError { .. }
        )
    }
}
