//! Helpers for running short-lived external commands with strict
//! timeouts. Collaborator tools (mixer, daemon probes, the STT binary)
//! must never be able to hang a control loop.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {status}: {stderr}")]
    NonZero {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} produced invalid UTF-8 output")]
    InvalidUtf8 { program: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run a command to completion and capture its stdout.
///
/// The child is spawned with `kill_on_drop`, so expiry of the timeout
/// tears it down rather than leaking it.
pub async fn run_with_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, ExecError> {
    let mut command = tokio::process::Command::new(program);
    command
        .args(args)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true);

    let child = command.spawn().map_err(|source| ExecError::Launch {
        program: program.to_string(),
        source,
    })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            if output.status.success() {
                String::from_utf8(output.stdout).map_err(|_| ExecError::InvalidUtf8 {
                    program: program.to_string(),
                })
            } else {
                Err(ExecError::NonZero {
                    program: program.to_string(),
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                })
            }
        }
        Ok(Err(e)) => Err(ExecError::Io(e)),
        Err(_) => Err(ExecError::Timeout {
            program: program.to_string(),
            timeout,
        }),
    }
}
