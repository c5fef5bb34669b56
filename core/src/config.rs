//! Client configuration.

use std::time::Duration;

use crate::endpoint::{build_path, Endpoint};
use crate::http::HttpRequest;

pub const DEFAULT_API_ROOT: &str = "https://v6.exchangerate-api.com/v6";
pub const DEFAULT_OPEN_API_ROOT: &str = "https://open.er-api.com/v6";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Settings for an `ExchangeRateClient`. The API key is always supplied by
/// the caller; nothing is read from the environment.
#[derive(Clone)]
pub struct ClientConfig {
    api_root: String,
    api_key: String,
    timeout: Duration,
    cache_ttl: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Point the client at another server (mock servers, proxies).
    pub fn with_api_root(mut self, api_root: &str) -> Self {
        self.api_root = api_root.trim_end_matches('/').to_string();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// `{api_root}/{api_key}`, the prefix every endpoint hangs off.
    pub fn account_url(&self) -> String {
        format!("{}/{}", self.api_root, self.api_key)
    }

    /// GET request for `endpoint` with ordered positional parameters.
    pub fn request(&self, endpoint: Endpoint, params: &[Option<String>]) -> HttpRequest {
        HttpRequest {
            url: build_path(&self.account_url(), endpoint, params),
            timeout: self.timeout,
        }
    }
}

// Keep the key out of debug output and logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_root", &self.api_root)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}
