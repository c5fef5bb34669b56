//! Endpoint names, path construction, and per-endpoint error handler lists.
//!
//! Each endpoint recognises a fixed, ordered list of API error kinds. The
//! classifier walks the list in order and the first kind whose `error-type`
//! tag matches wins.

use crate::error::ApiErrorKind;

/// Account-scoped endpoints of the exchange-rate API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Latest,
    Pair,
    Enriched,
    History,
    Quota,
    Codes,
}

const LATEST_HANDLERS: &[ApiErrorKind] = &[
    ApiErrorKind::UnsupportedCode,
    ApiErrorKind::MalformedRequest,
    ApiErrorKind::InvalidKey,
    ApiErrorKind::InactiveAccount,
    ApiErrorKind::QuotaReached,
];

const ENRICHED_HANDLERS: &[ApiErrorKind] = &[
    ApiErrorKind::UnsupportedCode,
    ApiErrorKind::MalformedRequest,
    ApiErrorKind::InvalidKey,
    ApiErrorKind::InactiveAccount,
    ApiErrorKind::QuotaReached,
    ApiErrorKind::PlanUpgradeRequired,
];

const HISTORY_HANDLERS: &[ApiErrorKind] = &[
    ApiErrorKind::NoDataAvailable,
    ApiErrorKind::UnsupportedCode,
    ApiErrorKind::MalformedRequest,
    ApiErrorKind::InvalidKey,
    ApiErrorKind::InactiveAccount,
    ApiErrorKind::QuotaReached,
    ApiErrorKind::PlanUpgradeRequired,
];

const ACCOUNT_HANDLERS: &[ApiErrorKind] = &[
    ApiErrorKind::InvalidKey,
    ApiErrorKind::InactiveAccount,
    ApiErrorKind::QuotaReached,
];

impl Endpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Latest => "latest",
            Endpoint::Pair => "pair",
            Endpoint::Enriched => "enriched",
            Endpoint::History => "history",
            Endpoint::Quota => "quota",
            Endpoint::Codes => "codes",
        }
    }

    /// Error kinds this endpoint can legitimately report, in match order.
    pub fn handlers(self) -> &'static [ApiErrorKind] {
        match self {
            Endpoint::Latest | Endpoint::Pair => LATEST_HANDLERS,
            Endpoint::Enriched => ENRICHED_HANDLERS,
            Endpoint::History => HISTORY_HANDLERS,
            Endpoint::Quota | Endpoint::Codes => ACCOUNT_HANDLERS,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join `base`, the endpoint name, and every present parameter with `/`.
/// Absent parameters are skipped without leaving an empty segment.
pub fn build_path(base: &str, endpoint: Endpoint, params: &[Option<String>]) -> String {
    let mut path = format!("{}/{}", base.trim_end_matches('/'), endpoint.as_str());
    for param in params.iter().flatten() {
        path.push('/');
        path.push_str(param);
    }
    path
}
