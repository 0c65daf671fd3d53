//! Core error types for zapgate.
//!
//! This module defines the central error type shared across the gate crates.
//! Each subsystem error is represented as a variant for clear error propagation.

use thiserror::Error;

/// Central error type for gate operations.
///
/// The driver absorbs API-level failures into boolean outcomes per its
/// contract; this type covers the places where a typed error is the right
/// surface (configuration, process launch, I/O).
#[derive(Error, Debug)]
pub enum GateError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scanner API errors (transport, JSON decoding)
    #[error("scanner API error: {0}")]
    Api(String),

    /// Scanner process launch errors
    #[error("scanner process error: {0}")]
    Process(String),

    /// A poll loop exceeded its wall-clock deadline
    #[error("timed out: {0}")]
    Timeout(String),

    /// The pipeline step was cancelled while waiting
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found at the given path
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `GateError`.
pub type Result<T> = std::result::Result<T, GateError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
