//! Rate limiter configuration.

use serde::{Deserialize, Serialize};

use super::limiter::ThrottleError;

/// Default number of calls allowed per period.
pub const DEFAULT_LIMIT: u32 = 1000;

/// Default refill period in milliseconds.
pub const DEFAULT_PERIOD_MS: u64 = 1000;

/// Default sleep after a denied call, in milliseconds.
pub const DEFAULT_BACKOFF_MS: u64 = 200;

/// Default number of consecutive denials tolerated before aborting.
pub const DEFAULT_MAX_CONSECUTIVE_DENIALS: u32 = 10;

/// Configuration for call throttling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Maximum tokens in the bucket (calls allowed per period)
    pub limit: u32,

    /// Period over which `limit` tokens are refilled, in milliseconds
    pub period_ms: u64,

    /// Sleep between a denial and the next attempt, in milliseconds
    pub backoff_ms: u64,

    /// Consecutive denials tolerated before a guarded call fails
    pub max_consecutive_denials: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            period_ms: DEFAULT_PERIOD_MS,
            backoff_ms: DEFAULT_BACKOFF_MS,
            max_consecutive_denials: DEFAULT_MAX_CONSECUTIVE_DENIALS,
        }
    }
}

impl ThrottleConfig {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bucket size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the refill period.
    pub fn with_period_ms(mut self, period_ms: u64) -> Self {
        self.period_ms = period_ms;
        self
    }

    /// Set the backoff sleep.
    pub fn with_backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.backoff_ms = backoff_ms;
        self
    }

    /// Set the consecutive denial threshold.
    pub fn with_max_consecutive_denials(mut self, max: u32) -> Self {
        self.max_consecutive_denials = max;
        self
    }

    /// Tokens refilled per elapsed millisecond.
    pub fn refill_rate_per_ms(&self) -> f64 {
        self.limit as f64 / self.period_ms as f64
    }

    /// Check that the limiter can be built from this config.
    pub fn validate(&self) -> Result<(), ThrottleError> {
        if self.limit == 0 {
            return Err(ThrottleError::InvalidConfig(
                "limit must be greater than zero".to_string(),
            ));
        }
        if self.period_ms == 0 {
            return Err(ThrottleError::InvalidConfig(
                "period_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
