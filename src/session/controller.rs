use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::state::{RecordOutcome, RecordingSlot, SessionSnapshot, StopOutcome, ToggleAction};
use crate::bus::{Publisher, StatusUpdate};
use crate::capture::{self, ArtifactInfo, CaptureProcess, CaptureSettings, PlaybackSettings};
use crate::error::{SessionError, VolumeError};
use crate::query::normalize_transcript;
use crate::transcribe::Transcriber;
use crate::volume::{MonitorHandle, MonitorSettings, VolumeSensor, VolumeSink};

/// Settings shared by all controller operations.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub capture: CaptureSettings,
    pub playback: PlaybackSettings,
    pub monitor: MonitorSettings,
}

/// Single source of truth for the capture/transcription lifecycle.
///
/// Both command sources converge here. The recording axis and the
/// volume axis each have their own mutex, so unrelated operations never
/// serialize against each other, while each axis's transitions stay
/// linearizable. No lock is held across an external-process launch,
/// stop-wait, transcription, or publish.
pub struct SessionController {
    settings: ControllerSettings,
    publisher: Arc<dyn Publisher>,
    transcriber: Arc<dyn Transcriber>,
    sensor: Option<Arc<dyn VolumeSensor>>,
    sink: Arc<dyn VolumeSink>,

    /// Recording axis.
    recording: Mutex<RecordingSlot>,

    /// Volume axis: present iff the monitor loop is running.
    monitor: Mutex<Option<MonitorHandle>>,

    /// Set once the remote command source has attached.
    remote_attached: AtomicBool,

    /// Set by `shutdown()`; all later operations are closed no-ops.
    closed: AtomicBool,
}

impl SessionController {
    pub fn new(
        settings: ControllerSettings,
        publisher: Arc<dyn Publisher>,
        transcriber: Arc<dyn Transcriber>,
        sensor: Option<Arc<dyn VolumeSensor>>,
        sink: Arc<dyn VolumeSink>,
    ) -> Self {
        Self {
            settings,
            publisher,
            transcriber,
            sensor,
            sink,
            recording: Mutex::new(RecordingSlot::Idle),
            monitor: Mutex::new(None),
            remote_attached: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Start a capture session. Idempotent while a recording is live.
    pub async fn record(&self) -> Result<RecordOutcome, SessionError> {
        if self.is_closed() {
            return Ok(RecordOutcome::Closed);
        }

        {
            let mut slot = self.recording.lock().await;
            let busy = match &mut *slot {
                RecordingSlot::Launching => true,
                RecordingSlot::Active(process) => process.is_alive(),
                RecordingSlot::Idle => false,
            };
            if busy {
                debug!("Recording already in progress");
                return Ok(RecordOutcome::AlreadyRecording);
            }
            // Idle, or a handle whose process exited on its own:
            // reserve the slot so the launch happens outside the lock.
            *slot = RecordingSlot::Launching;
        }

        // Clear any stale query display from the previous session.
        if let Err(e) = self.publisher.publish_query("").await {
            warn!("Failed to clear query display: {e}");
        }

        let process = match CaptureProcess::spawn(&self.settings.capture) {
            Ok(process) => process,
            Err(e) => {
                *self.recording.lock().await = RecordingSlot::Idle;
                error!("Failed to start capture process: {e}");
                self.publish_status(StatusUpdate::Error).await;
                return Err(SessionError::Capture(e));
            }
        };

        {
            let mut slot = self.recording.lock().await;
            if self.is_closed() {
                // Shutdown ran while we were launching; do not leak the
                // process past it.
                *slot = RecordingSlot::Idle;
                drop(slot);
                if let Err(e) = process.stop(self.settings.capture.stop_timeout).await {
                    warn!("Failed to stop capture process after shutdown: {e}");
                }
                return Ok(RecordOutcome::Closed);
            }
            *slot = RecordingSlot::Active(process);
        }

        self.publish_status(StatusUpdate::Recording).await;
        Ok(RecordOutcome::Started)
    }

    /// Stop the live capture and run the transcribe → normalize →
    /// publish pipeline. Without a live capture this is a no-op.
    pub async fn stop_and_transcribe(&self) -> Result<StopOutcome, SessionError> {
        if self.is_closed() {
            return Ok(StopOutcome::Closed);
        }

        let process = {
            let mut slot = self.recording.lock().await;
            match std::mem::replace(&mut *slot, RecordingSlot::Idle) {
                RecordingSlot::Active(mut process) => {
                    if process.is_alive() {
                        process
                    } else {
                        debug!("Capture process already exited");
                        return Ok(StopOutcome::NoActiveRecording);
                    }
                }
                RecordingSlot::Launching => {
                    // A concurrent record() is mid-launch; this stop
                    // linearizes before it completes.
                    *slot = RecordingSlot::Launching;
                    return Ok(StopOutcome::NoActiveRecording);
                }
                RecordingSlot::Idle => return Ok(StopOutcome::NoActiveRecording),
            }
        };

        let capture_id = process.id;
        let started_at = process.started_at;

        match process.stop(self.settings.capture.stop_timeout).await {
            Ok(report) => {
                if report.forced {
                    error!(%capture_id, "Capture ignored stop signal and was force-killed");
                }
                let duration = Utc::now().signed_duration_since(started_at);
                info!(
                    %capture_id,
                    duration_ms = duration.num_milliseconds(),
                    "Recording stopped"
                );
            }
            Err(e) => {
                error!(%capture_id, "Failed to stop capture process: {e}");
                self.publish_status(StatusUpdate::Error).await;
                return Err(SessionError::Capture(e));
            }
        }

        self.transcribe_and_publish().await
    }

    /// Transcribe the last captured artifact without requiring a live
    /// recording. Used by the local `T` command when idle.
    pub async fn transcribe_artifact(&self) -> Result<StopOutcome, SessionError> {
        if self.is_closed() {
            return Ok(StopOutcome::Closed);
        }
        self.transcribe_and_publish().await
    }

    /// Start recording if idle, stop and transcribe if live. The state
    /// is read once at dispatch time; last command wins.
    pub async fn toggle_recording(&self) -> Result<ToggleAction, SessionError> {
        if self.is_recording().await {
            Ok(ToggleAction::Stopped(self.stop_and_transcribe().await?))
        } else {
            Ok(ToggleAction::Recorded(self.record().await?))
        }
    }

    /// Play the last captured artifact to completion.
    pub async fn play_back(&self) -> Result<(), SessionError> {
        if self.is_closed() {
            return Ok(());
        }
        if self.is_recording().await {
            warn!("Playback requested while a recording is in progress");
        }

        let artifact = &self.settings.capture.artifact;
        if !artifact.exists() {
            return Err(SessionError::ArtifactMissing(artifact.clone()));
        }

        capture::play_back(&self.settings.playback, artifact).await?;
        Ok(())
    }

    /// Flip the volume monitor, returning the new active state. Any
    /// previous monitor instance is cancelled and joined before state
    /// flips, so at most one loop is ever alive.
    pub async fn toggle_volume_monitor(&self) -> Result<bool, SessionError> {
        if self.is_closed() {
            return Ok(false);
        }

        let mut guard = self.monitor.lock().await;

        if let Some(handle) = guard.take() {
            handle.stop(self.settings.monitor.join_timeout).await;
            info!("Volume monitoring disabled");
            Ok(false)
        } else {
            let sensor = self
                .sensor
                .clone()
                .ok_or(SessionError::Volume(VolumeError::Unavailable))?;
            let handle = MonitorHandle::spawn(
                sensor,
                Arc::clone(&self.sink),
                self.settings.monitor.tick,
            );
            *guard = Some(handle);
            info!("Volume monitoring enabled");
            Ok(true)
        }
    }

    /// Tear everything down. Idempotent and best-effort: failures are
    /// logged and shutdown always completes. The cleared outbound
    /// topics are the last observable messages.
    pub async fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            debug!("Shutdown already performed");
            return;
        }

        info!("Shutting down session controller");

        {
            let mut guard = self.monitor.lock().await;
            if let Some(handle) = guard.take() {
                handle.stop(self.settings.monitor.join_timeout).await;
            }
        }

        let process = {
            let mut slot = self.recording.lock().await;
            match std::mem::replace(&mut *slot, RecordingSlot::Idle) {
                RecordingSlot::Active(process) => Some(process),
                _ => None,
            }
        };
        if let Some(process) = process {
            if let Err(e) = process.stop(self.settings.capture.stop_timeout).await {
                warn!("Failed to stop capture process during shutdown: {e}");
            }
        }

        if let Err(e) = self.publisher.publish_query("").await {
            warn!("Failed to clear query topic during shutdown: {e}");
        }
        self.publish_status(StatusUpdate::Clear).await;

        info!("Session controller closed");
    }

    /// Non-blocking view of whether a capture is live.
    pub async fn is_recording(&self) -> bool {
        let mut slot = self.recording.lock().await;
        match &mut *slot {
            RecordingSlot::Active(process) => process.is_alive(),
            RecordingSlot::Launching => true,
            RecordingSlot::Idle => false,
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            recording: self.is_recording().await,
            volume_monitor_active: self.monitor.lock().await.is_some(),
            remote_control_active: self.remote_attached.load(Ordering::SeqCst),
            closed: self.is_closed(),
        }
    }

    /// Record that the remote command source has attached.
    pub fn mark_remote_attached(&self) {
        if !self.remote_attached.swap(true, Ordering::SeqCst) {
            info!("Remote control attached");
        }
    }

    pub fn volume_available(&self) -> bool {
        self.sensor.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Shared transcribe → normalize → publish tail.
    async fn transcribe_and_publish(&self) -> Result<StopOutcome, SessionError> {
        let artifact = &self.settings.capture.artifact;

        if !artifact.exists() {
            warn!(artifact = %artifact.display(), "No captured artifact to transcribe");
            self.publish_status(StatusUpdate::Error).await;
            return Err(SessionError::ArtifactMissing(artifact.clone()));
        }

        self.publish_status(StatusUpdate::Processing).await;

        // Header probe is informational; the transcriber is the judge
        // of whether the artifact is usable.
        match ArtifactInfo::probe(artifact) {
            Ok(info) => debug!(
                duration_seconds = info.duration_seconds,
                sample_rate = info.sample_rate,
                channels = info.channels,
                "Captured artifact"
            ),
            Err(e) => warn!("Could not probe captured artifact: {e}"),
        }

        let transcript = match self.transcriber.transcribe(artifact).await {
            Ok(transcript) => transcript,
            Err(e) => {
                error!("Transcription failed: {e}");
                self.publish_status(StatusUpdate::Error).await;
                return Ok(StopOutcome::TranscriptionFailed);
            }
        };

        let query = normalize_transcript(&transcript);
        info!(%transcript, %query, "Transcription complete");

        if let Err(e) = self.publisher.publish_query(&query).await {
            // The transcript is not re-queued; the operator re-issues
            // the command if they still want it.
            error!("Failed to publish query: {e}");
            self.publish_status(StatusUpdate::Error).await;
            return Err(SessionError::Publish(e));
        }

        self.publish_status(StatusUpdate::Clear).await;
        Ok(StopOutcome::TranscriptReady(query))
    }

    async fn publish_status(&self, status: StatusUpdate) {
        if let Err(e) = self.publisher.publish_status(status).await {
            warn!(status = status.as_str(), "Failed to publish status: {e}");
        }
    }
}
