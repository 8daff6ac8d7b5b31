use crate::capture::CaptureProcess;

/// Occupancy of the recording axis.
///
/// `Launching` reserves the slot while a `record()` call spawns the
/// capture process outside the lock, so no lock is ever held across an
/// external launch and concurrent starts still collapse to one.
pub(crate) enum RecordingSlot {
    Idle,
    Launching,
    Active(CaptureProcess),
}

/// Outcome of a `record()` call. `AlreadyRecording` is an idempotent
/// no-op, not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Started,
    AlreadyRecording,
    /// The controller has been shut down.
    Closed,
}

/// Outcome of a `stop_and_transcribe()` (or artifact transcription)
/// call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// Pipeline completed; the normalized query was published.
    TranscriptReady(String),
    NoActiveRecording,
    TranscriptionFailed,
    Closed,
}

/// What a `toggle_recording()` call ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleAction {
    Recorded(RecordOutcome),
    Stopped(StopOutcome),
}

/// Read-only view of controller state for the UI banner and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub recording: bool,
    pub volume_monitor_active: bool,
    pub remote_control_active: bool,
    pub closed: bool,
}
