//! In-process fake of the ExchangeRate-API v6 service.
//!
//! Serves the account-scoped endpoints under `/v6/{key}/...` and the
//! open-access endpoint under `/open/latest/{base}`. Behaviour is driven by
//! the API key so tests can provoke each error type:
//!
//! | key             | behaviour                                      |
//! |-----------------|------------------------------------------------|
//! | `test-key`      | full access                                    |
//! | `free-key`      | `plan-upgrade-required` on enriched / history  |
//! | `inactive-key`  | `inactive-account` everywhere                  |
//! | `exhausted-key` | `quota-reached` everywhere                     |
//! | anything else   | `invalid-key` everywhere                       |

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const VALID_KEY: &str = "test-key";
pub const FREE_KEY: &str = "free-key";
pub const INACTIVE_KEY: &str = "inactive-key";
pub const EXHAUSTED_KEY: &str = "exhausted-key";

pub const PLAN_QUOTA: u64 = 30000;
pub const REFRESH_DAY_OF_MONTH: u64 = 17;

/// Earliest year the fake has historical data for.
pub const FIRST_HISTORY_YEAR: i32 = 1990;

const LAST_UPDATE_UNIX: i64 = 1585267200;
const LAST_UPDATE_UTC: &str = "Fri, 27 Mar 2020 00:00:00 +0000";
const NEXT_UPDATE_UNIX: i64 = 1585353700;
const NEXT_UPDATE_UTC: &str = "Sat, 28 Mar 2020 00:00:00 +0000";

#[derive(Debug)]
struct Currency {
    code: &'static str,
    name: &'static str,
    usd_rate: f64,
    locale: &'static str,
    two_letter_code: &'static str,
    name_short: &'static str,
    display_symbol: &'static str,
}

const CURRENCIES: &[Currency] = &[
    Currency {
        code: "USD",
        name: "United States Dollar",
        usd_rate: 1.0,
        locale: "United States",
        two_letter_code: "US",
        name_short: "Dollar",
        display_symbol: "0024",
    },
    Currency {
        code: "EUR",
        name: "Euro",
        usd_rate: 0.9013,
        locale: "European Union",
        two_letter_code: "EU",
        name_short: "Euro",
        display_symbol: "20AC",
    },
    Currency {
        code: "GBP",
        name: "Pound Sterling",
        usd_rate: 0.7912,
        locale: "United Kingdom",
        two_letter_code: "GB",
        name_short: "Pound",
        display_symbol: "00A3",
    },
    Currency {
        code: "JPY",
        name: "Japanese Yen",
        usd_rate: 151.62,
        locale: "Japan",
        two_letter_code: "JP",
        name_short: "Yen",
        display_symbol: "00A5",
    },
];

fn currency(code: &str) -> Result<&'static Currency, ApiFailure> {
    CURRENCIES
        .iter()
        .find(|c| c.code == code)
        .ok_or(ApiFailure::UNSUPPORTED_CODE)
}

fn rate(base: &Currency, target: &Currency) -> f64 {
    target.usd_rate / base.usd_rate
}

fn rates_from(base: &Currency) -> BTreeMap<&'static str, f64> {
    CURRENCIES.iter().map(|c| (c.code, rate(base, c))).collect()
}

/// Request counters, shared with the router.
#[derive(Debug, Default)]
pub struct Stats {
    requests: AtomicU64,
    codes_requests: AtomicU64,
}

impl Stats {
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn codes_requests(&self) -> u64 {
        self.codes_requests.load(Ordering::SeqCst)
    }
}

pub type SharedStats = Arc<Stats>;

/// Error payload in the API's `{"result":"error","error-type":...}` shape.
#[derive(Debug, Clone, Copy)]
pub struct ApiFailure {
    status: StatusCode,
    error_type: &'static str,
}

impl ApiFailure {
    const UNSUPPORTED_CODE: Self = Self::new(StatusCode::NOT_FOUND, "unsupported-code");
    const MALFORMED_REQUEST: Self = Self::new(StatusCode::BAD_REQUEST, "malformed-request");
    const INVALID_KEY: Self = Self::new(StatusCode::FORBIDDEN, "invalid-key");
    const INACTIVE_ACCOUNT: Self = Self::new(StatusCode::FORBIDDEN, "inactive-account");
    const QUOTA_REACHED: Self = Self::new(StatusCode::TOO_MANY_REQUESTS, "quota-reached");
    const PLAN_UPGRADE_REQUIRED: Self = Self::new(StatusCode::FORBIDDEN, "plan-upgrade-required");
    const NO_DATA_AVAILABLE: Self = Self::new(StatusCode::NOT_FOUND, "no-data-available");

    const fn new(status: StatusCode, error_type: &'static str) -> Self {
        Self { status, error_type }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        tracing::info!(status = self.status.as_u16(), error_type = self.error_type, "rejected request");
        let body = json!({"result": "error", "error-type": self.error_type});
        (self.status, Json(body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiFailure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Free,
    Paid,
}

fn authorize(key: &str) -> Result<Plan, ApiFailure> {
    match key {
        VALID_KEY => Ok(Plan::Paid),
        FREE_KEY => Ok(Plan::Free),
        INACTIVE_KEY => Err(ApiFailure::INACTIVE_ACCOUNT),
        EXHAUSTED_KEY => Err(ApiFailure::QUOTA_REACHED),
        _ => Err(ApiFailure::INVALID_KEY),
    }
}

fn parse_amount(raw: &str) -> Result<f64, ApiFailure> {
    raw.parse::<f64>()
        .ok()
        .filter(|a| a.is_finite() && *a >= 0.0)
        .ok_or(ApiFailure::MALFORMED_REQUEST)
}

pub fn app() -> Router {
    app_with_stats(SharedStats::default())
}

pub fn app_with_stats(stats: SharedStats) -> Router {
    Router::new()
        .route("/v6/{key}/codes", get(codes))
        .route("/v6/{key}/quota", get(quota))
        .route("/v6/{key}/latest/{base}", get(latest))
        .route("/v6/{key}/pair/{base}/{target}", get(pair))
        .route("/v6/{key}/pair/{base}/{target}/{amount}", get(pair_with_amount))
        .route("/v6/{key}/enriched/{base}/{target}", get(enriched))
        .route("/v6/{key}/history/{base}/{year}/{month}/{day}", get(history))
        .route(
            "/v6/{key}/history/{base}/{year}/{month}/{day}/{amount}",
            get(history_with_amount),
        )
        .route("/open/latest/{base}", get(open_latest))
        .with_state(stats)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_stats(listener: TcpListener, stats: SharedStats) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_stats(stats)).await
}

fn update_times() -> Value {
    json!({
        "time_last_update_unix": LAST_UPDATE_UNIX,
        "time_last_update_utc": LAST_UPDATE_UTC,
        "time_next_update_unix": NEXT_UPDATE_UNIX,
        "time_next_update_utc": NEXT_UPDATE_UTC,
    })
}

fn success(fields: Value) -> Json<Value> {
    let mut body = json!({"result": "success"});
    if let (Some(map), Value::Object(fields)) = (body.as_object_mut(), fields) {
        map.extend(fields);
    }
    Json(body)
}

fn with_update_times(mut fields: Value) -> Value {
    if let (Some(target), Value::Object(times)) = (fields.as_object_mut(), update_times()) {
        target.extend(times);
    }
    fields
}

async fn codes(State(stats): State<SharedStats>, Path(key): Path<String>) -> ApiResult {
    stats.requests.fetch_add(1, Ordering::SeqCst);
    stats.codes_requests.fetch_add(1, Ordering::SeqCst);
    authorize(&key)?;
    let codes: Vec<[&str; 2]> = CURRENCIES.iter().map(|c| [c.code, c.name]).collect();
    tracing::info!(count = codes.len(), "served supported codes");
    Ok(success(json!({"supported_codes": codes})))
}

async fn quota(State(stats): State<SharedStats>, Path(key): Path<String>) -> ApiResult {
    let served = stats.requests.fetch_add(1, Ordering::SeqCst) + 1;
    authorize(&key)?;
    tracing::info!(served, "served quota");
    Ok(success(json!({
        "plan_quota": PLAN_QUOTA,
        "requests_remaining": PLAN_QUOTA.saturating_sub(served),
        "refresh_day_of_month": REFRESH_DAY_OF_MONTH,
    })))
}

async fn latest(State(stats): State<SharedStats>, Path((key, base)): Path<(String, String)>) -> ApiResult {
    stats.requests.fetch_add(1, Ordering::SeqCst);
    authorize(&key)?;
    let base = currency(&base)?;
    tracing::info!(base = base.code, "served latest rates");
    Ok(success(with_update_times(json!({
        "base_code": base.code,
        "conversion_rates": rates_from(base),
    }))))
}

fn pair_body(base: &str, target: &str, amount: Option<f64>) -> ApiResult {
    let base = currency(base)?;
    let target = currency(target)?;
    let conversion_rate = rate(base, target);
    tracing::info!(base = base.code, target = target.code, ?amount, "served pair conversion");
    let mut fields = json!({
        "base_code": base.code,
        "target_code": target.code,
        "conversion_rate": conversion_rate,
    });
    if let (Some(amount), Some(map)) = (amount, fields.as_object_mut()) {
        map.insert("conversion_result".to_string(), json!(amount * conversion_rate));
    }
    Ok(success(with_update_times(fields)))
}

async fn pair(
    State(stats): State<SharedStats>,
    Path((key, base, target)): Path<(String, String, String)>,
) -> ApiResult {
    stats.requests.fetch_add(1, Ordering::SeqCst);
    authorize(&key)?;
    pair_body(&base, &target, None)
}

async fn pair_with_amount(
    State(stats): State<SharedStats>,
    Path((key, base, target, amount)): Path<(String, String, String, String)>,
) -> ApiResult {
    stats.requests.fetch_add(1, Ordering::SeqCst);
    authorize(&key)?;
    let amount = parse_amount(&amount)?;
    pair_body(&base, &target, Some(amount))
}

async fn enriched(
    State(stats): State<SharedStats>,
    Path((key, base, target)): Path<(String, String, String)>,
) -> ApiResult {
    stats.requests.fetch_add(1, Ordering::SeqCst);
    if authorize(&key)? == Plan::Free {
        return Err(ApiFailure::PLAN_UPGRADE_REQUIRED);
    }
    let base = currency(&base)?;
    let target = currency(&target)?;
    tracing::info!(base = base.code, target = target.code, "served enriched data");
    Ok(success(with_update_times(json!({
        "base_code": base.code,
        "target_code": target.code,
        "conversion_rate": rate(base, target),
        "target_data": {
            "locale": target.locale,
            "two_letter_code": target.two_letter_code,
            "currency_name": target.name,
            "currency_name_short": target.name_short,
            "display_symbol": target.display_symbol,
            "flag_url": format!("https://www.exchangerate-api.com/img/docs/{}.gif", target.two_letter_code),
        },
    }))))
}

fn history_body(base: &str, year: &str, month: &str, day: &str, amount: Option<f64>) -> ApiResult {
    let (Ok(year), Ok(month), Ok(day)) = (year.parse::<i32>(), month.parse::<u32>(), day.parse::<u32>())
    else {
        return Err(ApiFailure::MALFORMED_REQUEST);
    };
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(ApiFailure::MALFORMED_REQUEST);
    }
    let base = currency(base)?;
    if year < FIRST_HISTORY_YEAR {
        return Err(ApiFailure::NO_DATA_AVAILABLE);
    }
    tracing::info!(base = base.code, year, month, day, ?amount, "served historical data");
    let mut fields = json!({
        "year": year,
        "month": month,
        "day": day,
        "base_code": base.code,
    });
    if let Some(map) = fields.as_object_mut() {
        match amount {
            Some(amount) => {
                let amounts: BTreeMap<_, _> = rates_from(base)
                    .into_iter()
                    .map(|(code, rate)| (code, rate * amount))
                    .collect();
                map.insert("requested_amount".to_string(), json!(amount));
                map.insert("conversion_amounts".to_string(), json!(amounts));
            }
            None => {
                map.insert("conversion_rates".to_string(), json!(rates_from(base)));
            }
        }
    }
    Ok(success(fields))
}

async fn history(
    State(stats): State<SharedStats>,
    Path((key, base, year, month, day)): Path<(String, String, String, String, String)>,
) -> ApiResult {
    stats.requests.fetch_add(1, Ordering::SeqCst);
    if authorize(&key)? == Plan::Free {
        return Err(ApiFailure::PLAN_UPGRADE_REQUIRED);
    }
    history_body(&base, &year, &month, &day, None)
}

async fn history_with_amount(
    State(stats): State<SharedStats>,
    Path((key, base, year, month, day, amount)): Path<(String, String, String, String, String, String)>,
) -> ApiResult {
    stats.requests.fetch_add(1, Ordering::SeqCst);
    if authorize(&key)? == Plan::Free {
        return Err(ApiFailure::PLAN_UPGRADE_REQUIRED);
    }
    let amount = parse_amount(&amount)?;
    history_body(&base, &year, &month, &day, Some(amount))
}

/// The open endpoint reports errors with a 200 status and `result: error`.
async fn open_latest(State(stats): State<SharedStats>, Path(base): Path<String>) -> Json<Value> {
    stats.requests.fetch_add(1, Ordering::SeqCst);
    match currency(&base) {
        Ok(base) => {
            tracing::info!(base = base.code, "served open-access rates");
            let mut body = json!({
                "result": "success",
                "provider": "https://www.exchangerate-api.com",
                "base_code": base.code,
                "rates": rates_from(base),
            });
            if let (Some(map), Value::Object(times)) = (body.as_object_mut(), update_times()) {
                map.extend(times);
            }
            Json(body)
        }
        Err(failure) => {
            tracing::info!(error_type = failure.error_type, "rejected open-access request");
            Json(json!({"result": "error", "error-type": failure.error_type}))
        }
    }
}
