//! External capture and playback processes
//!
//! The capture transport is an opaque external process (`arecord`-style)
//! writing the microphone to a fixed artifact path until told to stop.
//! This module owns its lifecycle: spawn, liveness poll, graceful stop
//! with a bounded wait, and forced kill when the bound expires.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::CaptureError;

/// Settings for the external capture process.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Capture program, e.g. "arecord"
    pub program: String,
    /// ALSA device identifier, e.g. "plughw:4,0"
    pub device: String,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Sample format name passed to the capture program, e.g. "S32_LE"
    pub format: String,
    /// Channel count
    pub channels: u16,
    /// Path the capture process writes to
    pub artifact: PathBuf,
    /// How long to wait for a graceful exit before force-killing
    pub stop_timeout: Duration,
}

/// Settings for the external playback process.
#[derive(Debug, Clone)]
pub struct PlaybackSettings {
    /// Playback program, e.g. "aplay"
    pub program: String,
    /// ALSA device identifier, e.g. "plughw:3,0"
    pub device: String,
}

/// Result of stopping a capture process.
#[derive(Debug)]
pub struct StopReport {
    /// True when the process ignored the stop signal and had to be killed.
    pub forced: bool,
    pub status: std::process::ExitStatus,
}

/// A running external capture process.
///
/// Ownership is the liveness contract: whoever holds the handle is the
/// only one who can stop it, and `stop` consumes it.
pub struct CaptureProcess {
    child: tokio::process::Child,
    program: String,
    /// Capture id for log correlation.
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
}

impl CaptureProcess {
    /// Launch the capture process described by `settings`.
    pub fn spawn(settings: &CaptureSettings) -> Result<Self, CaptureError> {
        let mut command = tokio::process::Command::new(&settings.program);
        command
            .arg("-D")
            .arg(&settings.device)
            .arg(format!("-c{}", settings.channels))
            .arg("-r")
            .arg(settings.sample_rate.to_string())
            .arg("-f")
            .arg(&settings.format)
            .arg(&settings.artifact)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| CaptureError::Launch {
            program: settings.program.clone(),
            source,
        })?;

        let id = Uuid::new_v4();
        info!(
            capture_id = %id,
            program = %settings.program,
            artifact = %settings.artifact.display(),
            "Capture process started"
        );

        Ok(Self {
            child,
            program: settings.program.clone(),
            id,
            started_at: Utc::now(),
        })
    }

    /// Non-blocking liveness poll.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Request a graceful stop (SIGTERM) and wait up to `timeout` for
    /// the process to exit; force-kill and wait again if it does not.
    /// Never hangs.
    pub async fn stop(mut self, timeout: Duration) -> Result<StopReport, CaptureError> {
        if let Some(pid) = self.child.id() {
            match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                Ok(()) => {}
                // Already exited; the wait below reaps it.
                Err(nix::errno::Errno::ESRCH) => {}
                Err(e) => {
                    return Err(CaptureError::Signal(format!(
                        "SIGTERM {}: {e}",
                        self.program
                    )))
                }
            }
        }

        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!(capture_id = %self.id, %status, "Capture process exited");
                Ok(StopReport {
                    forced: false,
                    status,
                })
            }
            Err(_) => {
                warn!(
                    capture_id = %self.id,
                    ?timeout,
                    "Capture process ignored stop signal, killing"
                );
                self.child
                    .start_kill()
                    .map_err(|e| CaptureError::Signal(format!("SIGKILL {}: {e}", self.program)))?;
                let status = self.child.wait().await?;
                Ok(StopReport {
                    forced: true,
                    status,
                })
            }
        }
    }
}

/// Header metadata of a captured WAV artifact.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactInfo {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl ArtifactInfo {
    /// Read the WAV header of a captured artifact.
    pub fn probe(path: impl AsRef<Path>) -> Result<Self> {
        let reader = hound::WavReader::open(path.as_ref())
            .context("Failed to open WAV artifact")?;

        let spec = reader.spec();
        let duration_seconds = reader.duration() as f64 / spec.sample_rate as f64;

        Ok(Self {
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }
}

/// Play the captured artifact back through the playback process,
/// blocking until playback completes.
pub async fn play_back(
    settings: &PlaybackSettings,
    artifact: &Path,
) -> Result<(), CaptureError> {
    info!(program = %settings.program, artifact = %artifact.display(), "Playing back");

    let status = tokio::process::Command::new(&settings.program)
        .arg("-D")
        .arg(&settings.device)
        .arg(artifact)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await
        .map_err(|source| CaptureError::Launch {
            program: settings.program.clone(),
            source,
        })?;

    if !status.success() {
        warn!(%status, "Playback process exited with failure");
    }

    Ok(())
}
