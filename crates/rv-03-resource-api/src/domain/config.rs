//! API configuration with validation.

use crate::domain::errors::ConfigError;
use rv_02_json_projection::TimestampFormat;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Environment variable overriding [`ApiConfig::timestamp_format`].
pub const ENV_TIMESTAMP_FORMAT: &str = "RV_TIMESTAMP_FORMAT";
/// Environment variable overriding [`ApiConfig::max_body_bytes`].
pub const ENV_MAX_BODY_BYTES: &str = "RV_MAX_BODY_BYTES";

/// Main API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// How timestamps appear in responses
    pub timestamp_format: TimestampFormat,
    /// Largest accepted request body; larger bodies are malformed
    pub max_body_bytes: usize,
    /// Private reads only for the owning user (otherwise any signed-in caller)
    pub private_reads_require_owner: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            timestamp_format: TimestampFormat::Iso8601,
            max_body_bytes: 1024 * 1024,
            private_reads_require_owner: true,
        }
    }
}

impl ApiConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_body_bytes cannot be 0".into(),
            ));
        }
        Ok(())
    }

    /// Defaults overridden from the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from `lookup`. Unparseable values are logged and
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(ENV_TIMESTAMP_FORMAT) {
            match TimestampFormat::parse(&raw) {
                Some(format) => {
                    self.timestamp_format = format;
                    info!("timestamp format set from environment: {:?}", format);
                }
                None => warn!("{} must be iso8601 or human, got {}", ENV_TIMESTAMP_FORMAT, raw),
            }
        }

        if let Some(raw) = lookup(ENV_MAX_BODY_BYTES) {
            match raw.trim().parse() {
                Ok(limit) => self.max_body_bytes = limit,
                Err(_) => warn!("{} must be a byte count, got {}", ENV_MAX_BODY_BYTES, raw),
            }
        }
    }

    /// Set one option by its environment key. Unlike `apply_overrides`, a bad
    /// value is an error.
    pub fn with_override(mut self, key: &str, value: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            ENV_TIMESTAMP_FORMAT => {
                self.timestamp_format = TimestampFormat::parse(value).ok_or_else(invalid)?;
            }
            ENV_MAX_BODY_BYTES => {
                self.max_body_bytes = value.trim().parse().map_err(|_| invalid())?;
            }
            _ => return Err(invalid()),
        }
        Ok(self)
    }
}
