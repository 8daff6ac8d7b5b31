use async_trait::async_trait;
use std::time::Duration;

use crate::error::VolumeError;
use crate::subprocess::run_with_timeout;

/// Applies a computed volume level to the system output. Applying the
/// same level twice is harmless, so the monitor can re-apply every
/// tick.
#[async_trait]
pub trait VolumeSink: Send + Sync {
    async fn apply(&self, percent: u8) -> Result<(), VolumeError>;
}

/// Settings for the external mixer tool.
#[derive(Debug, Clone)]
pub struct MixerSettings {
    /// Mixer program, e.g. "amixer"
    pub program: String,
    /// Mixer control name, e.g. "Master"
    pub control: String,
    /// Ceiling on a single mixer invocation
    pub timeout: Duration,
}

/// Sink shelling out to the system mixer tool, one bounded invocation
/// per tick.
pub struct MixerSink {
    settings: MixerSettings,
}

impl MixerSink {
    pub fn new(settings: MixerSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl VolumeSink for MixerSink {
    async fn apply(&self, percent: u8) -> Result<(), VolumeError> {
        let level = format!("{percent}%");

        run_with_timeout(
            &self.settings.program,
            &["set", &self.settings.control, &level],
            self.settings.timeout,
        )
        .await
        .map_err(|e| VolumeError::Sink(e.to_string()))?;

        Ok(())
    }
}
