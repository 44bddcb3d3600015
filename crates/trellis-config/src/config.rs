//! Root configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, RouterConfig};

/// Complete Trellis configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer files and environment
/// variables over the defaults.
///
/// # Example
///
/// ```
/// use trellis_config::TrellisConfig;
///
/// let config = TrellisConfig::default();
/// assert!(!config.router.ignore_trailing_slash);
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TrellisConfig {
    /// Router path handling.
    #[serde(default)]
    pub router: RouterConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrellisConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the log level is empty or is
    /// not a valid filter directive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.enabled {
            trellis_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }
        Ok(())
    }

    /// Development preset: pretty `debug` logs with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use trellis_config::TrellisConfig;
    ///
    /// let config = TrellisConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config
    }

    /// Production preset: JSON `info` logs.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.include_location = false;
        config
    }
}
