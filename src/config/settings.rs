//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::runtime::{is_semantic_version, DEFAULT_VERSION};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Bundle generation settings.
    #[serde(default)]
    pub bundle: BundleConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_semantic_version(&self.bundle.default_version) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid default bundle version '{}'. Must be MAJOR.MINOR.PATCH",
                    self.bundle.default_version
                ),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

/// Bundle generation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleConfig {
    /// Version given to bundles when a call doesn't request one.
    /// Default: "0.0.1"
    #[serde(default = "default_version")]
    pub default_version: String,

    /// Whether generated bundles are marked as the primary bundle.
    #[serde(default)]
    pub master: bool,

    /// Run the validator on every conversion unless the call opts out.
    #[serde(default = "default_true")]
    pub validate_on_convert: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            default_version: default_version(),
            master: false,
            validate_on_convert: default_true(),
        }
    }
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

const fn default_true() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
