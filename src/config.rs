//! Layered configuration.
//!
//! Settings come from built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `CS1_` using `__` between nested keys
//! (for example `CS1_THROTTLE__LIMIT=500`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quota::QuotaConfig;
use crate::throttle::{ThrottleConfig, ThrottleError};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "CS1";

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The sources could not be read or merged.
    #[error("Config error: {0}")]
    Load(#[from] ::config::ConfigError),

    /// The configuration could not be rendered as TOML.
    #[error("TOML error: {0}")]
    Render(#[from] toml::ser::Error),

    /// The throttle section is unusable.
    #[error(transparent)]
    Throttle(#[from] ThrottleError),
}

/// Settings for every component of the library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cs1Config {
    pub throttle: ThrottleConfig,
    pub quota: QuotaConfig,
}

impl Cs1Config {
    /// Load defaults, then `path` if it exists, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every section is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.throttle.validate()?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("absent.toml");
        let config = Cs1Config::load(Some(path.as_path())).expect("load");
        assert_eq!(config.throttle, ThrottleConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("cs1.toml");
        fs::write(
            &path,
            "[throttle]\nlimit = 20\nbackoff_ms = 50\n\n[quota]\nbyte_limit = 4096\n",
        )
        .expect("write");

        let config = Cs1Config::load(Some(path.as_path())).expect("load");

        assert_eq!(config.throttle.limit, 20);
        assert_eq!(config.throttle.backoff_ms, 50);
        assert_eq!(config.throttle.period_ms, 1000);
        assert_eq!(config.quota.byte_limit, 4096);
    }

    #[test]
    fn test_invalid_throttle_rejected() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("cs1.toml");
        fs::write(&path, "[throttle]\nperiod_ms = 0\n").expect("write");

        assert!(matches!(
            Cs1Config::load(Some(path.as_path())),
            Err(ConfigError::Throttle(_))
        ));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = Cs1Config {
            throttle: ThrottleConfig::new().with_limit(42),
            quota: QuotaConfig::new(1234),
        };

        let rendered = config.to_toml().expect("render");
        assert!(rendered.contains("limit = 42"));

        let parsed: Cs1Config = toml::from_str(&rendered).expect("parse");
        assert_eq!(parsed, config);
    }
}
