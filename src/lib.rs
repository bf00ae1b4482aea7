//! Support library for an introductory programming course.
//!
//! - [`throttle`]: token bucket limiting how fast student code may issue
//!   drawing calls, failing runaway loops after repeated backoffs.
//! - [`quota`]: file writer that refuses to grow a file past a byte limit.
//! - [`ppm`]: plain-text PPM decoding with an optional strict validation pass.
//!
//! Each component owns its state; nothing here is process-global. Use
//! [`throttle::SharedRateLimiter`] when one limiter must serve several threads.

pub mod config;
pub mod logging;
pub mod ppm;
pub mod quota;
pub mod throttle;

pub use crate::config::{ConfigError, Cs1Config};
pub use ppm::{PixelGrid, PpmError, Rgb};
pub use quota::{BoundedWriter, QuotaConfig, QuotaError};
pub use throttle::{RateLimiter, SharedRateLimiter, ThrottleConfig, ThrottleError};
