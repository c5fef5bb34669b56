//! Supported-code cache with a time-to-live, and the wall-clock seam it reads.
//!
//! # Design
//! The cache holds the code set and the time it was fetched. It never talks
//! to the network itself: `ensure_fresh` receives the refresh as a closure so
//! the client can route it through its normal dispatch path. A failed refresh
//! leaves the previous contents untouched and the error propagates; there is
//! no fallback to stale data.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::ApiError;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Test support, not part of the
/// supported API.
#[doc(hidden)]
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let advanced = chrono::TimeDelta::from_std(by)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta));
        if let Some(advanced) = advanced {
            *now = advanced;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Cached set of currency codes the API supports.
#[derive(Debug)]
pub struct CodeCache {
    codes: HashSet<String>,
    fetched_at: Option<DateTime<Utc>>,
    ttl: Duration,
}

impl CodeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            codes: HashSet::new(),
            fetched_at: None,
            ttl,
        }
    }

    /// Stale when never fetched, empty, or older than the TTL.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        let Some(fetched_at) = self.fetched_at else {
            return true;
        };
        if self.codes.is_empty() {
            return true;
        }
        match (now - fetched_at).to_std() {
            Ok(age) => age > self.ttl,
            // Clock went backwards; keep the current set.
            Err(_) => false,
        }
    }

    /// Replace the whole set and stamp it with `now`.
    pub fn replace(&mut self, codes: HashSet<String>, now: DateTime<Utc>) {
        self.codes = codes;
        self.fetched_at = Some(now);
    }

    /// Run `refresh` if the cache is stale, then return the current set.
    pub fn ensure_fresh<F>(&mut self, now: DateTime<Utc>, refresh: F) -> Result<&HashSet<String>, ApiError>
    where
        F: FnOnce() -> Result<HashSet<String>, ApiError>,
    {
        if self.is_stale(now) {
            let codes = refresh()?;
            tracing::debug!(count = codes.len(), "refreshed supported currency codes");
            self.replace(codes, now);
        } else {
            tracing::trace!("supported currency codes served from cache");
        }
        Ok(&self.codes)
    }

    /// Case-sensitive membership after ensuring freshness.
    pub fn contains<F>(&mut self, code: &str, now: DateTime<Utc>, refresh: F) -> Result<bool, ApiError>
    where
        F: FnOnce() -> Result<HashSet<String>, ApiError>,
    {
        Ok(self.ensure_fresh(now, refresh)?.contains(code))
    }

    #[cfg(test)]
    fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }
}
