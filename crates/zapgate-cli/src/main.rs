//! zapgate — run a ZAP-compatible scanner as a build pipeline gate.
//!
//! Linear step flow: start the scanner daemon (unless attaching to a running
//! one), wait for its control port, apply optional session/policy/URL setup,
//! crawl the target, attack the discovered sites, and exit 0 only if every
//! step completed. All user-facing messaging lives here; the driver crates
//! only emit tracing diagnostics.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use zapgate_core::{GateConfig, GateError};
use zapgate_driver::{workflow, StepOutcome, ZapDriver};

#[derive(Parser, Debug)]
#[command(
    name = "zapgate",
    about = "Drive a ZAP-compatible scanner as a build pipeline gate",
    version
)]
struct Cli {
    /// target host to crawl and attack (e.g. http://127.0.0.1:8080)
    #[arg(long)]
    target: String,

    /// path to the gate TOML config
    #[arg(long, default_value = "zapgate.toml")]
    config: PathBuf,

    /// attach to an already-running scanner instead of launching one
    #[arg(long)]
    attach: bool,

    /// scanner mode to set after startup (safe, protect, standard, attack)
    #[arg(long)]
    mode: Option<String>,

    /// session file to load before scanning
    #[arg(long)]
    session: Option<String>,

    /// scan policy file to import before attacking
    #[arg(long)]
    policy: Option<String>,

    /// URL list file to import into the site tree before attacking
    #[arg(long)]
    import_urls: Option<String>,

    /// shut the scanner down when the run finishes
    #[arg(long)]
    shutdown: bool,

    /// global log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = GateConfig::load_with_env(&cli.config)?;
    let mut driver = ZapDriver::new(config.endpoint())?
        .with_allowed_hosts(config.attack.allowed_hosts.clone())
        .with_thresholds(config.thresholds);

    // Ctrl-C aborts both poll loops and the readiness probe
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping");
            signal_cancel.cancel();
        }
    });

    if cli.attach {
        tracing::info!(
            "Attaching to scanner on {}:{}",
            config.scanner.host,
            config.scanner.port
        );
    } else if !workflow::start_scanner(&driver, &config.startup, &cancel).await {
        return Err(GateError::Process("scanner failed to start".to_string()).into());
    }

    if let Some(mode) = &cli.mode {
        if !driver.set_mode(mode).await {
            return Err(GateError::Api(format!("failed to set scanner mode to {mode}")).into());
        }
    }
    if let Some(session) = &cli.session {
        if !driver.load_session(session).await {
            return Err(GateError::Api(format!("failed to load session from {session}")).into());
        }
    }
    if let Some(policy) = &cli.policy {
        if !driver.load_policy(policy).await {
            return Err(GateError::Api(format!("failed to import scan policy from {policy}")).into());
        }
    }
    if let Some(urls) = &cli.import_urls {
        if !driver.import_urls(urls).await {
            return Err(GateError::Api(format!("failed to import URLs from {urls}")).into());
        }
    }

    let crawl = workflow::run_crawl(&mut driver, &cli.target, &cancel).await;
    report_step("crawl", crawl);

    let attack = if crawl.is_success() {
        let params = config.scan_parameters();
        let outcome = workflow::run_attack(&mut driver, &params, &cancel).await;
        report_step("attack", outcome);
        outcome
    } else {
        StepOutcome::DispatchFailed
    };

    if cli.shutdown && !driver.shutdown().await {
        tracing::warn!("Scanner did not acknowledge shutdown");
    }

    if crawl.is_success() && attack.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn report_step(step: &str, outcome: StepOutcome) {
    match outcome {
        StepOutcome::Completed => tracing::info!("{} completed", step),
        StepOutcome::DispatchFailed => tracing::error!("{} could not be dispatched", step),
        StepOutcome::TimedOut => tracing::error!("{} timed out before completing", step),
        StepOutcome::Cancelled => tracing::error!("{} was cancelled", step),
    }
}
