//! Quota-limited file output.
//!
//! Student programs write files through a [`BoundedWriter`], which refuses any
//! write that would grow the file past a fixed byte limit (100MB by default).
//! Rejected writes never reach the file.

pub mod config;
pub mod writer;

pub use config::{QuotaConfig, BYTE_LIMIT_ENV_VAR, DEFAULT_BYTE_LIMIT};
pub use writer::{create_limited, open_limited, BoundedWriter, QuotaError, SizedSink};
