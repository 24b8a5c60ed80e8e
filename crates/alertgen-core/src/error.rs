//! Error types for the alertgen-core crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while compiling alert provisioning documents.
#[derive(Debug, Error)]
pub enum AlertGenError {
    /// A configuration value does not have the expected format.
    #[error("invalid value for {key}: {value:?} ({reason})")]
    ConfigFormat {
        /// Dotted path of the offending key.
        key: String,
        /// The raw value found in the configuration.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A required configuration key is absent.
    #[error("missing configuration key: {key}")]
    MissingKey {
        /// Dotted path of the missing key.
        key: String,
    },

    /// An alert rule could not be assembled.
    #[error("invalid alert rule: {reason}")]
    InvalidRule {
        /// The reason the rule is invalid.
        reason: String,
    },

    /// Reading the configuration or writing an output file failed.
    #[error("io error on {}: {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AlertGenError {
    /// Builds a [`AlertGenError::ConfigFormat`] for a duration string.
    pub(crate) fn bad_duration(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ConfigFormat {
            key: key.into(),
            value: value.into(),
            reason: "expected <integer><unit> with unit one of s, m, h, d".to_string(),
        }
    }

    /// Builds a [`AlertGenError::MissingKey`].
    pub(crate) fn missing(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    /// Builds an [`AlertGenError::Io`] for the given path.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for AlertGenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AlertGenError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for alertgen operations.
pub type Result<T> = std::result::Result<T, AlertGenError>;
