use std::env;

use serde::{Deserialize, Serialize};

/// Environment variable overriding the byte limit.
pub const BYTE_LIMIT_ENV_VAR: &str = "CS1_BYTE_LIMIT";

/// Default byte limit (~100MB).
pub const DEFAULT_BYTE_LIMIT: i64 = 100_000_000;

/// Configuration for quota-limited output files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Total bytes a file may hold, including its existing size
    /// (0 or negative disables the check).
    pub byte_limit: i64,
}

impl QuotaConfig {
    /// Create a new config with the specified limit.
    pub fn new(byte_limit: i64) -> Self {
        Self { byte_limit }
    }

    /// A config that never rejects writes.
    pub fn unlimited() -> Self {
        Self { byte_limit: 0 }
    }

    /// Build config from environment variables.
    pub fn from_env() -> Self {
        let byte_limit = env::var(BYTE_LIMIT_ENV_VAR)
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_BYTE_LIMIT);
        Self { byte_limit }
    }

    /// Check if the limit is enforced.
    pub fn is_enabled(&self) -> bool {
        self.byte_limit > 0
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
