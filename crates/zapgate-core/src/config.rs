//! Configuration management for zapgate.
//!
//! Provides TOML-based configuration loaded from an explicit path (pipeline
//! steps pass file paths around; there is no per-user config directory here)
//! with environment variable overrides.

use crate::error::ConfigResult;
use crate::types::{ScanParameters, ScannerEndpoint, SeverityThresholds};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Gate configuration for one pipeline invocation.
///
/// Loaded from a TOML file; missing sections and fields fall back to defaults,
/// so a minimal config only names what it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Scanner endpoint settings
    pub scanner: ScannerConfig,
    /// Attack run settings
    pub attack: AttackConfig,
    /// Scanner process startup settings
    pub startup: StartupConfig,
    /// Alert-count limits consumed by the report step
    pub thresholds: SeverityThresholds,
}

impl GateConfig {
    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `ZAPGATE_HOST`: Override the scanner host
    /// - `ZAPGATE_PORT`: Override the scanner port
    /// - `ZAPGATE_TIMEOUT_SECS`: Override the scan timeout
    pub fn load_with_env(path: &Path) -> ConfigResult<Self> {
        let mut config = Self::load(path)?;

        // Override from environment
        if let Ok(val) = std::env::var("ZAPGATE_HOST") {
            tracing::debug!("Override scanner.host from env: {}", val);
            config.scanner.host = val;
        }

        if let Ok(val) = std::env::var("ZAPGATE_PORT") {
            if let Ok(port) = val.parse() {
                tracing::debug!("Override scanner.port from env: {}", port);
                config.scanner.port = port;
            }
        }

        if let Ok(val) = std::env::var("ZAPGATE_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                tracing::debug!("Override scanner.timeout_secs from env: {}", secs);
                config.scanner.timeout_secs = secs;
            }
        }

        Ok(config)
    }

    /// The scanner endpoint described by this configuration.
    #[must_use]
    pub fn endpoint(&self) -> ScannerEndpoint {
        ScannerEndpoint::new(
            self.scanner.host.clone(),
            self.scanner.port,
            Duration::from_secs(self.scanner.timeout_secs),
        )
    }

    /// The attack-run parameters described by this configuration.
    #[must_use]
    pub fn scan_parameters(&self) -> ScanParameters {
        ScanParameters {
            user_id: self.attack.user_id,
            scan_policy_name: self.attack.scan_policy_name.clone(),
        }
    }
}

/// Scanner endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Host the scanner control API listens on
    pub host: String,
    /// Control API port
    pub port: u16,
    /// Wall-clock budget in seconds for a crawl or attack run
    pub timeout_secs: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9095,
            timeout_secs: 600,
        }
    }
}

/// Attack run settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Hosts eligible for active scanning; empty means loopback-only
    pub allowed_hosts: Vec<String>,
    /// Scanner-side user id to attack as
    pub user_id: Option<u32>,
    /// Named scan policy to attack under
    pub scan_policy_name: Option<String>,
}

/// Scanner process startup settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Directory containing the scanner executable
    pub install_dir: Option<PathBuf>,
    /// Working directory for the spawned process
    pub working_dir: Option<PathBuf>,
}
