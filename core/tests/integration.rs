//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in a background tokio runtime,
//! then drives every client operation over real HTTP through
//! `UreqTransport`. Validates URL construction, classification, and
//! decoding against the server's actual payloads.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use exchange_rate_core::{
    ApiError, ApiErrorKind, ClientConfig, ExchangeRateClient, ManualClock, OpenAccessClient,
    UreqTransport,
};
use mock_server::{Stats, EXHAUSTED_KEY, FREE_KEY, VALID_KEY};

/// Start the mock server and return its base address and request counters.
fn start_server() -> (String, Arc<Stats>) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();
    let stats = Arc::new(Stats::default());
    let server_stats = stats.clone();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_stats(listener, server_stats).await
        })
        .unwrap();
    });

    (format!("http://{addr}"), stats)
}

fn client(base: &str, key: &str) -> ExchangeRateClient<UreqTransport> {
    let config = ClientConfig::new(key).with_api_root(&format!("{base}/v6"));
    ExchangeRateClient::with_transport(config, UreqTransport::new())
}

#[test]
fn every_operation_round_trips() {
    let (base, stats) = start_server();
    let mut c = client(&base, VALID_KEY);

    // Step 1: supported codes.
    let codes = c.fetch_supported_codes().unwrap();
    assert!(codes.iter().any(|code| code.code == "JPY" && code.name == "Japanese Yen"));

    // Step 2: latest rates, served from the primed cache.
    let latest = c.fetch_standard_response("USD").unwrap();
    assert_eq!(latest.base_code, "USD");
    assert_eq!(latest.conversion_rates["EUR"], 0.9013);
    assert!(latest.update_times.time_next_update_utc.is_some());

    // Step 3: pair conversion with and without an amount.
    let pair = c.pair_conversion("USD", "EUR", None).unwrap();
    assert_eq!(pair.target_code, "EUR");
    assert_eq!(pair.conversion_result, None);
    let pair = c.pair_conversion("USD", "EUR", Some(10.0)).unwrap();
    assert!((pair.conversion_result.unwrap() - 9.013).abs() < 1e-9);

    // Step 4: enriched data.
    let enriched = c.fetch_enriched_data("GBP", "JPY").unwrap();
    assert_eq!(enriched.target_data.locale, "Japan");
    assert_eq!(enriched.target_data.display_symbol, "00A5");

    // Step 5: historical data.
    let date = NaiveDate::from_ymd_opt(2015, 2, 22).unwrap();
    let history = c.fetch_historical_data("USD", date, 4.0).unwrap();
    assert_eq!((history.year, history.month, history.day), (2015, 2, 22));
    assert_eq!(history.requested_amount, Some(4.0));
    assert_eq!(history.conversion_amounts.unwrap()["USD"], 4.0);

    // Step 6: quota. Codes were fetched once for the whole session.
    let quota = c.fetch_quota_info().unwrap();
    assert_eq!(quota.plan_quota, 30000);
    assert_eq!(quota.refresh_day_of_month, 17);
    assert_eq!(stats.codes_requests(), 1);
    assert_eq!(quota.requests_remaining, 30000 - stats.requests() as i64);
}

#[test]
fn unsupported_code_is_rejected_locally() {
    let (base, stats) = start_server();
    let mut c = client(&base, VALID_KEY);

    let err = c.pair_conversion("USD", "XYZ", None).unwrap_err();
    assert!(matches!(err, ApiError::UnsupportedCode(ref code) if code == "XYZ"));
    // Only the codes refresh reached the server.
    assert_eq!(stats.requests(), 1);
}

#[test]
fn negative_amount_never_reaches_the_server() {
    let (base, stats) = start_server();
    let mut c = client(&base, VALID_KEY);

    let err = c.pair_conversion("USD", "EUR", Some(-5.0)).unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));
    assert_eq!(stats.requests(), 0);
}

#[test]
fn cache_expires_after_ttl() {
    let (base, stats) = start_server();
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    let mut c = client(&base, VALID_KEY).with_clock(clock.clone());

    c.fetch_standard_response("USD").unwrap();
    clock.advance(Duration::from_secs(1800));
    c.fetch_standard_response("EUR").unwrap();
    assert_eq!(stats.codes_requests(), 1);

    clock.advance(Duration::from_secs(1801));
    c.fetch_standard_response("GBP").unwrap();
    assert_eq!(stats.codes_requests(), 2);
}

#[test]
fn account_errors_surface_from_the_refresh() {
    let (base, _stats) = start_server();

    let err = client(&base, "wrong-key").fetch_standard_response("USD").unwrap_err();
    assert!(matches!(err, ApiError::Api(ApiErrorKind::InvalidKey)));

    let err = client(&base, EXHAUSTED_KEY).fetch_quota_info().unwrap_err();
    assert!(matches!(err, ApiError::Api(ApiErrorKind::QuotaReached)));
}

#[test]
fn plan_and_history_errors() {
    let (base, _stats) = start_server();

    let mut free = client(&base, FREE_KEY);
    let err = free.fetch_enriched_data("USD", "EUR").unwrap_err();
    assert!(matches!(err, ApiError::Api(ApiErrorKind::PlanUpgradeRequired)));

    let mut c = client(&base, VALID_KEY);
    let date = NaiveDate::from_ymd_opt(1985, 6, 1).unwrap();
    let err = c.fetch_historical_data("USD", date, 1.0).unwrap_err();
    assert!(matches!(err, ApiError::Api(ApiErrorKind::NoDataAvailable)));
}

#[test]
fn open_access_rates() {
    let (base, _stats) = start_server();
    let open = OpenAccessClient::with_transport(&format!("{base}/open"), UreqTransport::new());

    let rates = open.fetch_exchange_rates("GBP").unwrap();
    assert_eq!(rates.base_code, "GBP");
    assert_eq!(rates.rates["GBP"], 1.0);

    let err = open.fetch_exchange_rates("XYZ").unwrap_err();
    assert!(matches!(err, ApiError::Api(ApiErrorKind::UnsupportedCode)));
}

#[test]
fn unknown_route_is_unclassified() {
    let (base, _stats) = start_server();
    // Root without the /v6 prefix: every route 404s with an empty body.
    let config = ClientConfig::new(VALID_KEY).with_api_root(&base);
    let c = ExchangeRateClient::with_transport(config, UreqTransport::new());

    let err = c.fetch_quota_info().unwrap_err();
    assert!(matches!(err, ApiError::UnknownError { status: 404 }));
    assert!(err.is_unclassified());
}
