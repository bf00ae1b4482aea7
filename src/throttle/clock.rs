//! Time sources for the rate limiter.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic millisecond clock with a blocking sleep.
pub trait Clock: Send + Sync {
    /// Milliseconds since an arbitrary fixed origin. Never decreases.
    fn now_millis(&self) -> u64;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Wall clock backed by `Instant` and `thread::sleep`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Hand-driven clock.
///
/// Time only moves through [`ManualClock::advance`], or on `sleep` when built
/// with [`ManualClock::advancing`]. Sleeps never block; their total is
/// recorded so callers can assert on backoff behaviour.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
    slept_ms: AtomicU64,
    sleeps: AtomicU64,
    advance_on_sleep: AtomicBool,
}

impl ManualClock {
    /// A frozen clock starting at zero.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A clock whose `sleep` moves time forward by the slept duration.
    pub fn advancing() -> Arc<Self> {
        let clock = Self::default();
        clock.advance_on_sleep.store(true, Ordering::SeqCst);
        Arc::new(clock)
    }

    pub fn advance(&self, duration: Duration) {
        self.now_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn advance_millis(&self, millis: u64) {
        self.now_ms.fetch_add(millis, Ordering::SeqCst);
    }

    /// Total time requested through `sleep`.
    pub fn total_slept(&self) -> Duration {
        Duration::from_millis(self.slept_ms.load(Ordering::SeqCst))
    }

    /// Number of `sleep` calls.
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration) {
        let millis = duration.as_millis() as u64;
        self.slept_ms.fetch_add(millis, Ordering::SeqCst);
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        if self.advance_on_sleep.load(Ordering::SeqCst) {
            self.now_ms.fetch_add(millis, Ordering::SeqCst);
        }
    }
}
