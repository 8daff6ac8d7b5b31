//! Speech-to-text collaborator
//!
//! Transcription is delegated to an opaque external binary that takes
//! an audio file path and prints the transcript. The trait seam keeps
//! the session controller testable without the binary installed.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::TranscribeError;
use crate::subprocess::run_with_timeout;

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio artifact at `audio`, returning the raw
    /// transcript text.
    async fn transcribe(&self, audio: &Path) -> Result<String, TranscribeError>;

    /// Engine name for logging.
    fn name(&self) -> &str;
}

/// Settings for the external STT binary.
#[derive(Debug, Clone)]
pub struct TranscriberSettings {
    /// Path to the STT binary, e.g. "whisper.cpp/build/bin/whisper-cli"
    pub binary: String,
    /// Path to the model file
    pub model: PathBuf,
    /// Hard ceiling on a single transcription run
    pub timeout: Duration,
}

/// Transcriber backed by a whisper.cpp style command-line binary.
pub struct WhisperCliTranscriber {
    settings: TranscriberSettings,
}

impl WhisperCliTranscriber {
    pub fn new(settings: TranscriberSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String, TranscribeError> {
        if !audio.exists() {
            return Err(TranscribeError::Missing(audio.to_path_buf()));
        }

        let model = self.settings.model.to_string_lossy().into_owned();
        let file = audio.to_string_lossy().into_owned();

        info!(binary = %self.settings.binary, audio = %file, "Transcribing audio");

        // -nt: no timestamps, plain transcript on stdout
        let output = run_with_timeout(
            &self.settings.binary,
            &["-m", &model, "-f", &file, "-nt"],
            self.settings.timeout,
        )
        .await?;

        Ok(output.trim().to_string())
    }

    fn name(&self) -> &str {
        "whisper-cli"
    }
}
