//! Zapgate Driver - Scan orchestration against a ZAP-compatible scanner.
//!
//! This crate drives an external web-application scanner daemon from a build
//! pipeline step: it bootstraps the process, dispatches crawl and active-scan
//! jobs under a host allow-list policy, and polls job status to completion or
//! timeout with no callback mechanism.
//!
//! # Features
//!
//! - HTTP/JSON control API client with uniform failure absorption
//! - Host allow-list guard (loopback-only default, fails closed)
//! - Crawl and multi-site attack dispatch with per-run job tracking
//! - Mean-of-jobs progress aggregation tolerant of failing status queries
//! - Process bootstrap with a TCP readiness probe
//! - Reusable poll-until-done-or-timeout loop with cancellation
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_util::sync::CancellationToken;
//! use zapgate_driver::{workflow, ZapDriver};
//!
//! let mut driver = ZapDriver::new(endpoint)?.with_allowed_hosts(hosts);
//! let cancel = CancellationToken::new();
//!
//! let crawl = workflow::run_crawl(&mut driver, "http://127.0.0.1:8080", &cancel).await;
//! let attack = workflow::run_attack(&mut driver, &params, &cancel).await;
//! assert!(crawl.is_success() && attack.is_success());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod allowlist;
pub mod bootstrap;
pub mod client;
pub mod driver;
#[allow(missing_docs)]
pub mod error;
pub mod poll;
pub mod workflow;

// Re-export commonly used types
pub use allowlist::is_scannable;
pub use client::ApiClient;
pub use driver::ZapDriver;
pub use error::{ApiError, ApiResult};
pub use poll::{poll_until, PollOutcome, COMPLETED_PERCENTAGE, SCAN_POLL_INTERVAL};
pub use workflow::StepOutcome;
