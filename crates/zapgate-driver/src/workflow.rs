//! Step-level flows composing dispatch with the poll loops.
//!
//! The poll loops belong to the calling workflow step, not to the driver:
//! the driver only knows how to dispatch jobs and read their status. These
//! functions are what a pipeline step invokes, in order: start the scanner,
//! crawl, attack.

use crate::bootstrap;
use crate::driver::ZapDriver;
use crate::poll::{poll_until, PollOutcome, SCAN_POLL_INTERVAL};
use tokio_util::sync::CancellationToken;
use zapgate_core::{ScanParameters, StartupConfig};

/// How a crawl or attack step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Dispatch succeeded and the jobs ran to completion
    Completed,
    /// The jobs could not be dispatched at all
    DispatchFailed,
    /// Dispatch succeeded but the poll loop hit its deadline
    TimedOut,
    /// The step was cancelled while waiting
    Cancelled,
}

impl StepOutcome {
    /// Whether the step finished its work.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, StepOutcome::Completed)
    }
}

impl From<PollOutcome> for StepOutcome {
    fn from(outcome: PollOutcome) -> Self {
        match outcome {
            PollOutcome::Completed => StepOutcome::Completed,
            PollOutcome::TimedOut => StepOutcome::TimedOut,
            PollOutcome::Cancelled => StepOutcome::Cancelled,
        }
    }
}

/// Launch the scanner daemon and wait for its control port.
pub async fn start_scanner(
    driver: &ZapDriver,
    startup: &StartupConfig,
    cancel: &CancellationToken,
) -> bool {
    let Some(install_dir) = &startup.install_dir else {
        tracing::error!("No scanner install directory configured");
        return false;
    };
    let working_dir = startup
        .working_dir
        .clone()
        .unwrap_or_else(|| install_dir.clone());

    if !bootstrap::start_process(driver.endpoint(), install_dir, &working_dir, cfg!(unix)) {
        return false;
    }

    bootstrap::wait_for_ready(driver.endpoint(), cancel).await
}

/// Start the crawler on `target` and drive it to completion or timeout.
pub async fn run_crawl(
    driver: &mut ZapDriver,
    target: &str,
    cancel: &CancellationToken,
) -> StepOutcome {
    tracing::info!("Starting crawler on host {}...", target);
    if !driver.start_crawl(target).await {
        tracing::error!("Failed to start crawler on host {}", target);
        return StepOutcome::DispatchFailed;
    }

    let timeout = driver.endpoint().timeout;
    let driver: &ZapDriver = driver;
    let outcome = poll_until(
        || driver.crawl_status(),
        timeout,
        SCAN_POLL_INTERVAL,
        cancel,
    )
    .await;
    outcome.into()
}

/// Attack every eligible discovered site and drive the jobs to completion or
/// timeout.
pub async fn run_attack(
    driver: &mut ZapDriver,
    params: &ScanParameters,
    cancel: &CancellationToken,
) -> StepOutcome {
    tracing::info!("Starting attack on all discovered sites...");
    if !driver.run_attack(params).await {
        tracing::error!("Failed to retrieve the site list, nothing attacked");
        return StepOutcome::DispatchFailed;
    }
    tracing::info!("Attacking {} site(s)", driver.attack_ids().len());

    let timeout = driver.endpoint().timeout;
    let driver: &ZapDriver = driver;
    let outcome = poll_until(
        || driver.attack_status(),
        timeout,
        SCAN_POLL_INTERVAL,
        cancel,
    )
    .await;
    outcome.into()
}
