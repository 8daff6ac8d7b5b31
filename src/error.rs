use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by session controller operations.
///
/// State-precondition outcomes (`AlreadyRecording`, `NoActiveRecording`)
/// are not errors; they are reported through the outcome enums in
/// `session::state`.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("No captured artifact at {0}")]
    ArtifactMissing(PathBuf),

    #[error("Publish failed: {0}")]
    Publish(anyhow::Error),

    #[error("Volume monitoring unavailable: {0}")]
    Volume(#[from] VolumeError),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to signal capture process: {0}")]
    Signal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("Audio artifact not found: {0}")]
    Missing(PathBuf),

    #[error(transparent)]
    Exec(#[from] crate::subprocess::ExecError),
}

#[derive(Error, Debug)]
pub enum VolumeError {
    #[error("No volume sensor present")]
    Unavailable,

    #[error("Sensor read failed: {0}")]
    Sensor(String),

    #[error("Failed to apply volume level: {0}")]
    Sink(String),
}
