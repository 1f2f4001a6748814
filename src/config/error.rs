//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// Threshold string could not be parsed as a float.
    #[error("failed to parse threshold '{value}': {source}")]
    ThresholdParseError {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// Threshold is outside the open-closed interval (0, 1].
    #[error("threshold {value} out of range: must be in (0.0, 1.0]")]
    ThresholdOutOfRange { value: f32 },

    /// Distractor list parsed to zero usable labels.
    #[error("distractor list '{value}' contains no usable labels")]
    EmptyDistractors { value: String },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
