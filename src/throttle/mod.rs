//! Call throttling for drawing operations.
//!
//! Drawing calls made from student code are routed through a token bucket so
//! that a runaway loop slows down first and then fails loudly instead of
//! flooding the display.
//!
//! # Overview
//!
//! - **ThrottleConfig**: bucket size, refill period and escalation settings
//! - **Clock**: time source seam (`SystemClock`, `ManualClock`)
//! - **RateLimiter**: single-owner token bucket with `query` and `guard`
//! - **SharedRateLimiter**: the same limiter behind a mutex for use across threads
//!
//! # Example
//!
//! ```ignore
//! use cs1_support::throttle::{RateLimiter, ThrottleConfig};
//!
//! let mut limiter = RateLimiter::new(ThrottleConfig::default())?;
//! for x in 0..100 {
//!     limiter.guard(|| canvas.draw_point(x, x))?;
//! }
//! ```

mod clock;
mod config;
mod limiter;
mod shared;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ThrottleConfig;
pub use limiter::{Admission, RateLimiter, ThrottleError, ThrottleStats};
pub use shared::SharedRateLimiter;
