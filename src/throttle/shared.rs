//! Thread-safe rate limiter handle.

use std::sync::{Arc, Mutex, MutexGuard};

use super::clock::{Clock, SystemClock};
use super::config::ThrottleConfig;
use super::limiter::{Admission, RateLimiter, ThrottleError, ThrottleStats};

/// Rate limiter shared between threads.
///
/// Token and denial counters are only touched under the lock. The lock is
/// released before backing off and before the guarded operation runs, so a
/// sleeping caller never blocks the others.
#[derive(Debug)]
pub struct SharedRateLimiter<C: Clock + Clone = SystemClock> {
    inner: Arc<Mutex<RateLimiter<C>>>,
    clock: C,
}

impl<C: Clock + Clone> Clone for SharedRateLimiter<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            clock: self.clock.clone(),
        }
    }
}

impl SharedRateLimiter<SystemClock> {
    /// Create a shared limiter driven by the system clock.
    pub fn new(config: ThrottleConfig) -> Result<Self, ThrottleError> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock + Clone> SharedRateLimiter<C> {
    pub fn with_clock(config: ThrottleConfig, clock: C) -> Result<Self, ThrottleError> {
        let limiter = RateLimiter::with_clock(config, clock.clone())?;
        Ok(Self {
            inner: Arc::new(Mutex::new(limiter)),
            clock,
        })
    }

    fn lock(&self) -> MutexGuard<'_, RateLimiter<C>> {
        // A panic inside `query` cannot leave the bucket half-updated.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns true iff the next call should be permitted.
    pub fn query(&self) -> bool {
        self.lock().query()
    }

    /// Run `op` once the limiter permits it. See [`RateLimiter::guard`].
    pub fn guard<T, F>(&self, op: F) -> Result<T, ThrottleError>
    where
        F: FnOnce() -> T,
    {
        loop {
            let admission = self.lock().admit();
            match admission {
                Admission::Permitted => return Ok(op()),
                Admission::Backoff(pause) => self.clock.sleep(pause),
                Admission::Exceeded(denials) => {
                    return Err(ThrottleError::RateExceeded { denials })
                }
            }
        }
    }

    pub fn available_tokens(&self) -> f64 {
        self.lock().available_tokens()
    }

    /// Get activity counters.
    pub fn stats(&self) -> ThrottleStats {
        self.lock().stats()
    }
}
