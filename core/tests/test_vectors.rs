//! Verify classification and URL building against JSON test vectors stored
//! in `test-vectors/`.
//!
//! Each classification vector names an endpoint, a simulated response, and
//! the expected outcome; each endpoint vector names an operation, its
//! arguments, and the expected request path.

use chrono::NaiveDate;
use exchange_rate_core::classify::check_response;
use exchange_rate_core::config::DEFAULT_API_ROOT;
use exchange_rate_core::{ApiError, ApiErrorKind, Endpoint, ExchangeRateClient, HttpResponse};

/// Parse the endpoint name used in test vectors.
fn parse_endpoint(s: &str) -> Endpoint {
    match s {
        "latest" => Endpoint::Latest,
        "pair" => Endpoint::Pair,
        "enriched" => Endpoint::Enriched,
        "history" => Endpoint::History,
        "quota" => Endpoint::Quota,
        "codes" => Endpoint::Codes,
        other => panic!("unknown endpoint: {other}"),
    }
}

fn parse_kind(s: &str) -> ApiErrorKind {
    match s {
        "UnsupportedCode" => ApiErrorKind::UnsupportedCode,
        "MalformedRequest" => ApiErrorKind::MalformedRequest,
        "InvalidKey" => ApiErrorKind::InvalidKey,
        "InactiveAccount" => ApiErrorKind::InactiveAccount,
        "QuotaReached" => ApiErrorKind::QuotaReached,
        "PlanUpgradeRequired" => ApiErrorKind::PlanUpgradeRequired,
        "NoDataAvailable" => ApiErrorKind::NoDataAvailable,
        other => panic!("unknown error kind: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn classify_test_vectors() {
    let raw = include_str!("../../test-vectors/classify.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let endpoint = parse_endpoint(case["endpoint"].as_str().unwrap());
        let response = HttpResponse {
            status: case["status"].as_u64().unwrap() as u16,
            body: case["body"].as_str().unwrap().to_string(),
        };
        let result = check_response(endpoint.handlers(), &response);

        match case["expected"].as_str().unwrap() {
            "ok" => assert!(result.is_ok(), "{name}: expected success, got {result:?}"),
            "unknown" => assert!(
                matches!(result, Err(ApiError::UnknownError { status }) if status == response.status),
                "{name}: expected UnknownError, got {result:?}"
            ),
            expected if expected.starts_with("unexpected:") => {
                let raw_type = &expected["unexpected:".len()..];
                match result {
                    Err(ApiError::UnexpectedErrorType(ref got)) => assert_eq!(got, raw_type, "{name}"),
                    other => panic!("{name}: expected UnexpectedErrorType, got {other:?}"),
                }
            }
            kind => {
                let kind = parse_kind(kind);
                assert!(
                    matches!(result, Err(ApiError::Api(got)) if got == kind),
                    "{name}: expected {kind:?}, got {result:?}"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoint paths
// ---------------------------------------------------------------------------

#[test]
fn endpoint_test_vectors() {
    let raw = include_str!("../../test-vectors/endpoints.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let api_key = vectors["api_key"].as_str().unwrap();

    let c = ExchangeRateClient::new(api_key);
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let args = &case["args"];
        let base = args["base"].as_str().unwrap_or_default();
        let target = args["target"].as_str().unwrap_or_default();
        let amount = args["amount"].as_f64();

        let req = match case["operation"].as_str().unwrap() {
            "latest" => c.build_standard_response(base),
            "pair" => c.build_pair_conversion(base, target, amount),
            "enriched" => c.build_enriched_data(base, target),
            "history" => {
                let date: NaiveDate = args["date"].as_str().unwrap().parse().unwrap();
                c.build_historical_data(base, date, amount.unwrap())
            }
            "quota" => c.build_quota_info(),
            "codes" => c.build_supported_codes(),
            other => panic!("{name}: unknown operation {other}"),
        };

        let expected = format!("{DEFAULT_API_ROOT}/{api_key}{}", case["path"].as_str().unwrap());
        assert_eq!(req.url, expected, "{name}: url");
        assert_eq!(req.timeout.as_secs(), 10, "{name}: timeout");
    }
}
