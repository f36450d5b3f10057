//! Error types for mson-runtime-mcp.
//!
//! The conversion core never fails; these errors cover configuration loading
//! and decoding of tool arguments at the server boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised while decoding tool arguments or encoding tool results.
#[derive(Error, Debug)]
pub enum ToolError {
    /// A required argument is absent.
    #[error("Missing required parameter: {name}")]
    MissingParameter {
        /// Argument name.
        name: &'static str,
    },

    /// The `model` argument is not a well-formed MSON model.
    #[error("Invalid MSON model: {source}")]
    InvalidModel {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The `bundle` argument arrived as a string that is not JSON.
    #[error("Invalid bundle JSON: {source}")]
    InvalidBundle {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The requested bundle version is not `MAJOR.MINOR.PATCH`.
    #[error("Invalid version '{version}': expected MAJOR.MINOR.PATCH")]
    InvalidVersion {
        /// The rejected version.
        version: String,
    },

    /// No entity has the requested id or name.
    #[error("Entity not found: {name}")]
    EntityNotFound {
        /// The requested id or name.
        name: String,
    },

    /// The result could not be serialised.
    #[error("Failed to serialise result")]
    Serialisation {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "invalid setting".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("invalid setting"));
    }

    #[test]
    fn tool_error_display() {
        let error = ToolError::MissingParameter { name: "model" };
        assert_eq!(error.to_string(), "Missing required parameter: model");

        let error = ToolError::InvalidVersion {
            version: "1.0".to_string(),
        };
        assert!(error.to_string().contains("MAJOR.MINOR.PATCH"));
    }

    #[test]
    fn invalid_model_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = ToolError::InvalidModel { source };
        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().starts_with("Invalid MSON model"));
    }

    #[test]
    fn invalid_bundle_is_not_labelled_as_model() {
        let source = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let error = ToolError::InvalidBundle { source };
        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().starts_with("Invalid bundle JSON"));
        assert!(!error.to_string().contains("MSON"));
    }
}
