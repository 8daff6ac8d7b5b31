//! Media-backend daemon management
//!
//! The music backend runs as a separate daemon process. It is started
//! once at startup if not already running and stopped best-effort at
//! shutdown; it takes no part in session control.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::subprocess::{run_with_timeout, ExecError};

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Settings for the managed daemon.
#[derive(Debug, Clone)]
pub struct DaemonSettings {
    pub enabled: bool,
    /// Daemon binary, e.g. "spotifyd"
    pub program: String,
    pub args: Vec<String>,
    /// Time to give the daemon after spawning before proceeding
    pub startup_grace: Duration,
}

/// Ensure the daemon is running: probe with pgrep, spawn detached if
/// absent, then wait out the startup grace period.
pub async fn start(settings: &DaemonSettings) -> Result<()> {
    let name = process_name(&settings.program);

    match run_with_timeout("pgrep", &["-x", name], PROBE_TIMEOUT).await {
        Ok(_) => {
            info!("{name} already running");
            return Ok(());
        }
        Err(ExecError::NonZero { .. }) => {
            // No match; fall through to spawn.
        }
        Err(e) => {
            warn!("Could not probe for {name}: {e}");
        }
    }

    info!("Starting {name}");

    let args: Vec<&str> = settings.args.iter().map(String::as_str).collect();
    tokio::process::Command::new(&settings.program)
        .args(&args)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to start {}", settings.program))?;

    sleep(settings.startup_grace).await;
    info!("{name} started");

    Ok(())
}

/// Stop the daemon best-effort. A pkill miss (daemon already gone) is
/// not an error.
pub async fn stop(settings: &DaemonSettings) -> Result<()> {
    let name = process_name(&settings.program);

    match run_with_timeout("pkill", &["-x", name], PROBE_TIMEOUT).await {
        Ok(_) => info!("{name} stopped"),
        Err(ExecError::NonZero { .. }) => debug!("{name} was not running"),
        Err(e) => warn!("Could not stop {name}: {e}"),
    }

    Ok(())
}

/// Process name as seen by pgrep/pkill: the basename of the configured
/// program path.
fn process_name(program: &str) -> &str {
    Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program)
}
