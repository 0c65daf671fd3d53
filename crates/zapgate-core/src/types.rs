//! Shared types used across the zapgate crates.
//!
//! This module defines the common newtypes and enums that provide type safety
//! and clear domain modeling for the scan orchestration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Opaque handle for a crawl or active-scan job started on the scanner.
///
/// The scanner hands these back when a spider or active scan is started and
/// expects them back when status is queried. They carry no meaning beyond
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(u32);

impl JobId {
    /// Create a new `JobId` from its raw value.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw job id value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the scanner control API lives.
///
/// Fixed once the process is bootstrapped; every API call and the readiness
/// probe target this address. `timeout` is the wall-clock budget for a full
/// crawl or attack run, not a per-request limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerEndpoint {
    /// Host the scanner listens on
    pub host: String,
    /// Control API port
    pub port: u16,
    /// Wall-clock budget for a crawl or attack poll loop
    pub timeout: Duration,
}

impl ScannerEndpoint {
    /// Create an endpoint description.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }
}

/// Options applied uniformly to every site in one attack run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanParameters {
    /// Scanner-side user to attack as; `None` runs unauthenticated
    pub user_id: Option<u32>,
    /// Named scan policy; `None` uses the scanner default
    pub scan_policy_name: Option<String>,
}

impl ScanParameters {
    /// Parameters for an unauthenticated attack under the default policy.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// Attack as a specific scanner user.
    #[must_use]
    pub fn as_user(mut self, user_id: u32) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Attack under a named scan policy.
    #[must_use]
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.scan_policy_name = Some(policy.into());
        self
    }
}

/// Alert severity buckets reported by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Every alert regardless of severity
    All,
    /// High-severity alerts
    High,
    /// Medium-severity alerts
    Medium,
    /// Low-severity alerts
    Low,
}

/// Per-severity maximum allowed alert counts.
///
/// Consumed by the report/gate step after the scans complete; the driver only
/// carries these so a single orchestrator instance holds everything one
/// pipeline invocation configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    /// Maximum total alerts before the build fails
    pub all: u32,
    /// Maximum high-severity alerts
    pub high: u32,
    /// Maximum medium-severity alerts
    pub medium: u32,
    /// Maximum low-severity alerts
    pub low: u32,
}

impl SeverityThresholds {
    /// Look up the limit for one severity bucket.
    #[must_use]
    pub fn limit(&self, severity: AlertSeverity) -> u32 {
        match severity {
            AlertSeverity::All => self.all,
            AlertSeverity::High => self.high,
            AlertSeverity::Medium => self.medium,
            AlertSeverity::Low => self.low,
        }
    }
}
