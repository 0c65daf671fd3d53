//! Scanner process bootstrap: spawn the daemon and probe its control port.
//!
//! Launch and readiness are deliberately separate. [`start_process`] only
//! reports whether the spawn call itself succeeded; the daemon takes tens of
//! seconds to open its port, which [`wait_for_ready`] observes with a raw TCP
//! probe under an absolute deadline.

use std::path::Path;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use zapgate_core::ScannerEndpoint;

/// Scanner launcher inside the install directory on unix platforms.
pub const UNIX_PROGRAM: &str = "zap.sh";
/// Scanner launcher inside the install directory on windows.
pub const WINDOWS_PROGRAM: &str = "zap.bat";

const CMD_DAEMON: &str = "-daemon";
const CMD_HOST: &str = "-host";
const CMD_PORT: &str = "-port";
const CMD_CONFIG: &str = "-config";

// Fixed configuration overrides: no API key, permissive API origin, long
// connection timeout for slow crawls.
const CONFIG_DISABLE_KEY: &str = "api.disablekey=true";
const CONFIG_ADDR_REGEX: &str = "api.addrs.addr.regex=true";
const CONFIG_ADDR_NAME: &str = "api.addrs.addr.name=.*";
const CONFIG_CONNECTION_TIMEOUT: &str = "connection.timeoutInSecs=600";

/// Absolute deadline for the readiness probe, from loop start.
pub const INITIALIZE_TIMEOUT: Duration = Duration::from_secs(100);
/// Fixed delay before each connection attempt.
pub const INITIALIZE_WAIT: Duration = Duration::from_secs(20);

/// Launch the scanner daemon bound to `endpoint`.
///
/// Returns true iff the spawn call succeeded. The child runs detached; this
/// does not wait for the control port to open.
pub fn start_process(
    endpoint: &ScannerEndpoint,
    install_dir: &Path,
    working_dir: &Path,
    platform_is_unix: bool,
) -> bool {
    let program = install_dir.join(if platform_is_unix {
        UNIX_PROGRAM
    } else {
        WINDOWS_PROGRAM
    });

    let mut command = Command::new(&program);
    command
        .arg(CMD_DAEMON)
        .arg(CMD_HOST)
        .arg(&endpoint.host)
        .arg(CMD_PORT)
        .arg(endpoint.port.to_string())
        .arg(CMD_CONFIG)
        .arg(CONFIG_DISABLE_KEY)
        .arg(CMD_CONFIG)
        .arg(CONFIG_ADDR_REGEX)
        .arg(CMD_CONFIG)
        .arg(CONFIG_ADDR_NAME)
        .arg(CMD_CONFIG)
        .arg(CONFIG_CONNECTION_TIMEOUT)
        .current_dir(working_dir);

    match command.spawn() {
        Ok(child) => {
            tracing::info!(
                "Scanner started from {} on {}:{}",
                program.display(),
                endpoint.host,
                endpoint.port
            );
            // Not kill-on-drop: the daemon outlives this handle
            drop(child);
            true
        }
        Err(e) => {
            tracing::error!("An error occurred while starting the scanner: {}", e);
            false
        }
    }
}

/// Wait for the scanner control port to accept a TCP connection.
///
/// Uses the fixed [`INITIALIZE_WAIT`] delay and [`INITIALIZE_TIMEOUT`]
/// deadline.
pub async fn wait_for_ready(endpoint: &ScannerEndpoint, cancel: &CancellationToken) -> bool {
    wait_for_ready_with(endpoint, INITIALIZE_WAIT, INITIALIZE_TIMEOUT, cancel).await
}

/// Readiness probe with injectable timing.
///
/// Sleeps `wait` before every attempt, so even an immediately-ready scanner
/// costs one wait. Connection refusal means "keep waiting"; cancellation is a
/// hard failure distinct from the deadline.
pub async fn wait_for_ready_with(
    endpoint: &ScannerEndpoint,
    wait: Duration,
    deadline: Duration,
    cancel: &CancellationToken,
) -> bool {
    let started = tokio::time::Instant::now();

    loop {
        if started.elapsed() >= deadline {
            tracing::error!(
                "Scanner failed to start: port {} never opened within {}s",
                endpoint.port,
                deadline.as_secs()
            );
            return false;
        }

        tokio::select! {
            () = cancel.cancelled() => {
                tracing::error!(
                    "Cancelled while waiting for the scanner on {}:{}",
                    endpoint.host,
                    endpoint.port
                );
                return false;
            }
            () = tokio::time::sleep(wait) => {}
        }

        match TcpStream::connect((endpoint.host.as_str(), endpoint.port)).await {
            Ok(_) => {
                tracing::info!("Scanner initialized on port {}", endpoint.port);
                return true;
            }
            Err(_) => {
                tracing::info!("Waiting for the scanner to initialize...");
            }
        }
    }
}
