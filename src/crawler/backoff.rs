//! Exponential backoff for failed URLs
//!
//! Two quantities come out of the same curve but from different bases:
//! - retry eligibility of a stored URL uses its current retry count as the
//!   exponent
//! - the sleep before in-flight retry attempt `R` uses `R - 1`

use crate::config::CrawlerConfig;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Upper bound on the exponent; the cap is reached long before this
const MAX_EXPONENT: u32 = 63;

/// Backoff curve `min(base * 2^n, max)` in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    base: f64,
    max: f64,
}

impl BackoffPolicy {
    pub fn new(base: f64, max: f64) -> Self {
        Self { base, max }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.base_backoff, config.max_backoff)
    }

    /// Backoff window in seconds after `retry_count` retryable failures
    pub fn backoff_seconds(&self, retry_count: u32) -> f64 {
        let exponent = retry_count.min(MAX_EXPONENT) as i32;
        (self.base * 2f64.powi(exponent)).min(self.max)
    }

    /// Earliest time a URL may be attempted again
    ///
    /// `None` when the window reaches past the representable date range.
    pub fn retry_at(
        &self,
        last_attempted_at: DateTime<Utc>,
        retry_count: u32,
    ) -> Option<DateTime<Utc>> {
        let micros = (self.backoff_seconds(retry_count) * 1_000_000.0).round() as i64;
        last_attempted_at.checked_add_signed(chrono::Duration::microseconds(micros))
    }

    /// Whether a failed URL's backoff window has elapsed at `now`
    ///
    /// A URL that was never attempted is eligible immediately.
    pub fn is_retry_eligible(
        &self,
        last_attempted_at: Option<DateTime<Utc>>,
        retry_count: u32,
        now: DateTime<Utc>,
    ) -> bool {
        match last_attempted_at {
            None => true,
            Some(last) => self
                .retry_at(last, retry_count)
                .is_some_and(|retry_at| now >= retry_at),
        }
    }

    /// Sleep applied before in-flight retry attempt number `attempt`
    ///
    /// Attempt 1 sleeps `base`, attempt 2 sleeps `2 * base`, and so on.
    /// Returns `None` for a first attempt, a zero delay, or a delay too
    /// large to represent.
    pub fn pre_attempt_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 {
            return None;
        }
        let seconds = self.backoff_seconds(attempt - 1);
        if seconds > 0.0 {
            Duration::try_from_secs_f64(seconds).ok()
        } else {
            None
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(1.0, 60.0)
    }
}
