//! Wait-until-done-or-timeout driver shared by the crawl and attack flows.
//!
//! The scanner offers no callbacks; the only way to observe a job is to poll
//! its status. Both flows need the same loop shape, so the timeout arithmetic
//! lives here once: check, stop on completion without a trailing sleep, stop
//! on a wall-clock deadline, otherwise sleep a fixed interval or observe
//! cancellation.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Job progress value meaning "done".
pub const COMPLETED_PERCENTAGE: u8 = 100;

/// Fixed delay between status polls; keeps the scanner from being spammed
/// with status requests.
pub const SCAN_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How a poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The progress check reached 100
    Completed,
    /// The wall-clock deadline elapsed before completion
    TimedOut,
    /// The cancellation token fired while waiting
    Cancelled,
}

impl PollOutcome {
    /// Whether the loop observed completion.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, PollOutcome::Completed)
    }
}

/// Repeatedly run `check` until it reports completion, the deadline passes,
/// or the token is cancelled.
///
/// The deadline is wall-clock from loop entry, checked after every probe, so
/// a timeout shorter than one interval terminates without ever sleeping. The
/// iteration that observes completion skips the trailing sleep.
pub async fn poll_until<C, F>(
    mut check: C,
    timeout: Duration,
    interval: Duration,
    cancel: &CancellationToken,
) -> PollOutcome
where
    C: FnMut() -> F,
    F: Future<Output = u8>,
{
    let started = tokio::time::Instant::now();

    loop {
        let progress = check().await;
        tracing::info!("Progress is {}%", progress);

        if progress >= COMPLETED_PERCENTAGE {
            return PollOutcome::Completed;
        }

        if started.elapsed() >= timeout {
            tracing::warn!(
                "Timed out after {}s before the job completed",
                timeout.as_secs()
            );
            return PollOutcome::TimedOut;
        }

        tokio::select! {
            () = cancel.cancelled() => {
                tracing::warn!("Cancelled while waiting for the job to complete");
                return PollOutcome::Cancelled;
            }
            () = tokio::time::sleep(interval) => {}
        }
    }
}
