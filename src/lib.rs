pub mod bus;
pub mod capture;
pub mod config;
pub mod daemon;
pub mod error;
pub mod query;
pub mod session;
pub mod source;
pub mod subprocess;
pub mod transcribe;
pub mod volume;

pub use bus::{BusClient, ControlCommand, Publisher, StatusUpdate, Topics};
pub use capture::{CaptureProcess, CaptureSettings, PlaybackSettings};
pub use config::Config;
pub use error::{CaptureError, SessionError, TranscribeError, VolumeError};
pub use query::normalize_transcript;
pub use session::{
    ControllerSettings, RecordOutcome, SessionController, SessionSnapshot, StopOutcome,
    ToggleAction,
};
pub use transcribe::{Transcriber, TranscriberSettings, WhisperCliTranscriber};
pub use volume::{MixerSink, MonitorSettings, VolumeSensor, VolumeSink};
