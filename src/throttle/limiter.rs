//! Token bucket rate limiter with backoff-and-abort escalation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::config::ThrottleConfig;

/// Errors raised by the rate limiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThrottleError {
    /// The caller kept hitting an empty bucket; almost always a runaway loop.
    #[error(
        "Too many calls too frequently ({denials} consecutive denials)! Do you have an infinite loop?"
    )]
    RateExceeded {
        /// Consecutive denials observed when the call was aborted.
        denials: u32,
    },

    /// The limiter configuration cannot be used.
    #[error("Invalid throttle configuration: {0}")]
    InvalidConfig(String),
}

/// Outcome of a single admission attempt by a guarded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Run the operation now.
    Permitted,
    /// Sleep for the given duration, then try again.
    Backoff(Duration),
    /// Too many consecutive denials; the call must fail.
    Exceeded(u32),
}

/// Counters describing limiter activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThrottleStats {
    pub permits: u64,
    pub denials: u64,
    pub backoffs: u64,
    pub aborts: u64,
    pub available_tokens: f64,
    pub limit: u32,
}

impl ThrottleStats {
    /// Format as a human-readable string.
    pub fn format(&self) -> String {
        format!(
            "permits: {}, denials: {}, backoffs: {}, aborts: {}, tokens: {:.1}/{}",
            self.permits,
            self.denials,
            self.backoffs,
            self.aborts,
            self.available_tokens,
            self.limit
        )
    }
}

/// Token bucket with continuous refill.
///
/// The bucket holds at most `limit` tokens and refills at
/// `limit / period_ms` tokens per elapsed millisecond. A query is permitted
/// while more than one token is available.
///
/// # Example
///
/// ```ignore
/// use cs1_support::throttle::{RateLimiter, ThrottleConfig};
///
/// let mut limiter = RateLimiter::new(ThrottleConfig::default())?;
/// limiter.guard(|| draw_line(0, 0, 10, 10))?;
/// ```
#[derive(Debug)]
pub struct RateLimiter<C: Clock = SystemClock> {
    config: ThrottleConfig,
    clock: C,
    refill_rate_per_ms: f64,
    last_refill_ms: u64,
    available_tokens: f64,
    consecutive_denials: u32,
    stats: ThrottleStats,
}

impl RateLimiter<SystemClock> {
    /// Create a limiter driven by the system clock.
    pub fn new(config: ThrottleConfig) -> Result<Self, ThrottleError> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Create a limiter driven by the given clock. The bucket starts full.
    pub fn with_clock(config: ThrottleConfig, clock: C) -> Result<Self, ThrottleError> {
        config.validate()?;
        let now = clock.now_millis();
        let limit = config.limit;
        Ok(Self {
            refill_rate_per_ms: config.refill_rate_per_ms(),
            available_tokens: limit as f64,
            last_refill_ms: now,
            consecutive_denials: 0,
            stats: ThrottleStats {
                limit,
                ..ThrottleStats::default()
            },
            config,
            clock,
        })
    }

    /// Refill for the time elapsed since the last call.
    fn refill(&mut self) {
        let now = self.clock.now_millis();
        let elapsed = now.saturating_sub(self.last_refill_ms);
        self.last_refill_ms = now;

        let refilled = self.available_tokens + elapsed as f64 * self.refill_rate_per_ms;
        self.available_tokens = refilled.clamp(0.0, self.config.limit as f64);
    }

    /// Returns true iff the next call should be permitted.
    pub fn query(&mut self) -> bool {
        self.refill();
        if self.available_tokens > 1.0 {
            self.available_tokens -= 1.0;
            self.stats.permits += 1;
            true
        } else {
            self.stats.denials += 1;
            false
        }
    }

    /// Query once and apply the escalation policy to the result.
    pub fn admit(&mut self) -> Admission {
        if self.query() {
            self.consecutive_denials = 0;
            return Admission::Permitted;
        }

        self.consecutive_denials += 1;
        if self.consecutive_denials > self.config.max_consecutive_denials {
            let denials = self.consecutive_denials;
            self.consecutive_denials = 0;
            self.stats.aborts += 1;
            warn!(denials, "aborting throttled call after repeated denials");
            return Admission::Exceeded(denials);
        }

        self.stats.backoffs += 1;
        debug!(
            denials = self.consecutive_denials,
            backoff_ms = self.config.backoff_ms,
            "rate limited, backing off"
        );
        Admission::Backoff(Duration::from_millis(self.config.backoff_ms))
    }

    /// Run `op` once the limiter permits it.
    ///
    /// Denied attempts sleep for the configured backoff and retry. After more
    /// than `max_consecutive_denials` denials in a row the call fails with
    /// [`ThrottleError::RateExceeded`] and `op` is not run.
    pub fn guard<T, F>(&mut self, op: F) -> Result<T, ThrottleError>
    where
        F: FnOnce() -> T,
    {
        loop {
            match self.admit() {
                Admission::Permitted => return Ok(op()),
                Admission::Backoff(pause) => self.clock.sleep(pause),
                Admission::Exceeded(denials) => {
                    return Err(ThrottleError::RateExceeded { denials })
                }
            }
        }
    }

    /// Tokens currently in the bucket, as of the last call.
    pub fn available_tokens(&self) -> f64 {
        self.available_tokens
    }

    /// Denials since the last permit.
    pub fn consecutive_denials(&self) -> u32 {
        self.consecutive_denials
    }

    /// Get the configuration.
    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Get activity counters.
    pub fn stats(&self) -> ThrottleStats {
        ThrottleStats {
            available_tokens: self.available_tokens,
            ..self.stats.clone()
        }
    }
}
