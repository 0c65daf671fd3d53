//! Zapgate Core - Foundation crate for the zapgate pipeline gate.
//!
//! This crate provides the shared types, error handling, and configuration
//! management that the driver and CLI crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with environment overrides
//! - [`types`] - Shared types (`JobId`, `ScannerEndpoint`, `ScanParameters`,
//!   `SeverityThresholds`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AttackConfig, GateConfig, ScannerConfig, StartupConfig};
pub use error::{ConfigError, ConfigResult, GateError, Result};
pub use types::{AlertSeverity, JobId, ScanParameters, ScannerEndpoint, SeverityThresholds};
