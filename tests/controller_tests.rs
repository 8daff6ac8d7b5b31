use async_trait::async_trait;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use voice_station::bus::Publisher;
use voice_station::error::{TranscribeError, VolumeError};
use voice_station::session::{
    ControllerSettings, RecordOutcome, SessionController, StopOutcome,
};
use voice_station::transcribe::Transcriber;
use voice_station::volume::{MonitorSettings, VolumeSensor, VolumeSink};
use voice_station::{CaptureSettings, PlaybackSettings, StatusUpdate};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Channel {
    Status,
    Query,
}

/// Publisher that records every outbound message in order.
#[derive(Default)]
struct RecordingPublisher {
    messages: Mutex<Vec<(Channel, String)>>,
}

impl RecordingPublisher {
    fn all(&self) -> Vec<(Channel, String)> {
        self.messages.lock().unwrap().clone()
    }

    fn last_on(&self, channel: Channel) -> Option<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(c, _)| *c == channel)
            .map(|(_, m)| m.clone())
    }

    fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish_status(&self, status: StatusUpdate) -> anyhow::Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((Channel::Status, status.as_str().to_string()));
        Ok(())
    }

    async fn publish_query(&self, query: &str) -> anyhow::Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((Channel::Query, query.to_string()));
        Ok(())
    }
}

/// Transcriber returning a canned transcript (or a failure), counting
/// invocations.
struct FixedTranscriber {
    calls: AtomicUsize,
    text: &'static str,
    fail: bool,
}

impl FixedTranscriber {
    fn ok(text: &'static str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            text,
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            text: "",
            fail: true,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String, TranscribeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(TranscribeError::Missing(audio.to_path_buf()))
        } else {
            Ok(self.text.to_string())
        }
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct StaticSensor(f32);

#[async_trait]
impl VolumeSensor for StaticSensor {
    async fn read(&self) -> Result<f32, VolumeError> {
        Ok(self.0)
    }
}

#[derive(Default)]
struct NullSink {
    applies: AtomicUsize,
}

#[async_trait]
impl VolumeSink for NullSink {
    async fn apply(&self, _percent: u8) -> Result<(), VolumeError> {
        self.applies.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    launch_log: PathBuf,
    controller: Arc<SessionController>,
    publisher: Arc<RecordingPublisher>,
    transcriber: Arc<FixedTranscriber>,
    sink: Arc<NullSink>,
}

impl Fixture {
    /// Number of capture processes the fake capture script launched.
    fn launches(&self) -> usize {
        std::fs::read_to_string(&self.launch_log)
            .map(|log| log.lines().count())
            .unwrap_or(0)
    }

    /// Wait for the spawned script(s) to write their launch lines, then
    /// a grace period in which a stray extra launch would surface.
    async fn settle_launches(&self, expected: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while self.launches() < expected && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

fn write_artifact(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..1600i32 {
        writer.write_sample((i % 64) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn fixture(transcriber: FixedTranscriber) -> Fixture {
    let dir = tempfile::tempdir().unwrap();

    // Stand-in capture process: logs its launch, then stays alive until
    // signalled, like the real capture tool.
    let launch_log = dir.path().join("launches.log");
    let script = dir.path().join("fake-capture.sh");
    std::fs::write(
        &script,
        format!(
            "#!/bin/sh\necho $$ >> \"{}\"\nexec sleep 30\n",
            launch_log.display()
        ),
    )
    .unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();

    let artifact = dir.path().join("songrequest.wav");
    write_artifact(&artifact);

    let settings = ControllerSettings {
        capture: CaptureSettings {
            program: script.to_string_lossy().into_owned(),
            device: "default".into(),
            sample_rate: 16000,
            format: "S16_LE".into(),
            channels: 1,
            artifact,
            stop_timeout: Duration::from_secs(2),
        },
        playback: PlaybackSettings {
            program: "true".into(),
            device: "default".into(),
        },
        monitor: MonitorSettings {
            tick: Duration::from_millis(10),
            join_timeout: Duration::from_millis(200),
        },
    };

    let publisher = Arc::new(RecordingPublisher::default());
    let transcriber = Arc::new(transcriber);
    let sink = Arc::new(NullSink::default());

    let controller = Arc::new(SessionController::new(
        settings,
        Arc::clone(&publisher) as Arc<dyn Publisher>,
        Arc::clone(&transcriber) as Arc<dyn Transcriber>,
        Some(Arc::new(StaticSensor(0.5)) as Arc<dyn VolumeSensor>),
        Arc::clone(&sink) as Arc<dyn VolumeSink>,
    ));

    Fixture {
        _dir: dir,
        launch_log,
        controller,
        publisher,
        transcriber,
        sink,
    }
}

#[tokio::test]
async fn test_record_is_idempotent() {
    let fx = fixture(FixedTranscriber::ok("play test by tester"));

    assert_eq!(fx.controller.record().await.unwrap(), RecordOutcome::Started);
    assert_eq!(
        fx.controller.record().await.unwrap(),
        RecordOutcome::AlreadyRecording
    );

    assert!(fx.controller.is_recording().await);
    fx.settle_launches(1).await;
    assert_eq!(fx.launches(), 1);

    fx.controller.shutdown().await;
}

#[tokio::test]
async fn test_stop_without_recording_is_noop() {
    let fx = fixture(FixedTranscriber::ok("anything"));

    assert_eq!(
        fx.controller.stop_and_transcribe().await.unwrap(),
        StopOutcome::NoActiveRecording
    );
    assert_eq!(fx.transcriber.calls(), 0);

    fx.controller.shutdown().await;
}

#[tokio::test]
async fn test_pipeline_publishes_normalized_query() {
    let fx = fixture(FixedTranscriber::ok("Play Thunderstruck by AC/DC"));

    assert_eq!(fx.controller.record().await.unwrap(), RecordOutcome::Started);

    let outcome = fx.controller.stop_and_transcribe().await.unwrap();
    assert_eq!(
        outcome,
        StopOutcome::TranscriptReady("Thunderstruck Ac/dc".into())
    );

    assert_eq!(
        fx.publisher.all(),
        vec![
            (Channel::Query, "".into()),
            (Channel::Status, "Recording".into()),
            (Channel::Status, "Processing Request".into()),
            (Channel::Query, "Thunderstruck Ac/dc".into()),
            (Channel::Status, "".into()),
        ]
    );

    fx.controller.shutdown().await;
}

#[tokio::test]
async fn test_transcription_failure_reports_error_status() {
    let fx = fixture(FixedTranscriber::failing());

    fx.controller.record().await.unwrap();
    let outcome = fx.controller.stop_and_transcribe().await.unwrap();

    assert_eq!(outcome, StopOutcome::TranscriptionFailed);
    assert_eq!(fx.publisher.last_on(Channel::Status), Some("error".into()));
    // No query may be published on failure; only the initial clear.
    let queries: Vec<String> = fx
        .publisher
        .all()
        .into_iter()
        .filter(|(c, _)| *c == Channel::Query)
        .map(|(_, m)| m)
        .collect();
    assert_eq!(queries, vec![String::new()]);

    fx.controller.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_records_start_exactly_one_process() {
    let fx = fixture(FixedTranscriber::ok("play races by rust"));

    let results = futures::future::join_all((0..8).map(|_| {
        let controller = Arc::clone(&fx.controller);
        async move { controller.record().await.unwrap() }
    }))
    .await;

    let started = results
        .iter()
        .filter(|r| **r == RecordOutcome::Started)
        .count();
    let already = results
        .iter()
        .filter(|r| **r == RecordOutcome::AlreadyRecording)
        .count();

    assert_eq!(started, 1);
    assert_eq!(already, 7);
    fx.settle_launches(1).await;
    assert_eq!(fx.launches(), 1);

    fx.controller.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_stops_transcribe_exactly_once() {
    let fx = fixture(FixedTranscriber::ok("play once by the invariants"));

    fx.controller.record().await.unwrap();

    let results = futures::future::join_all((0..8).map(|_| {
        let controller = Arc::clone(&fx.controller);
        async move { controller.stop_and_transcribe().await.unwrap() }
    }))
    .await;

    let ready = results
        .iter()
        .filter(|r| matches!(r, StopOutcome::TranscriptReady(_)))
        .count();
    let noop = results
        .iter()
        .filter(|r| **r == StopOutcome::NoActiveRecording)
        .count();

    assert_eq!(ready, 1);
    assert_eq!(noop, 7);
    assert_eq!(fx.transcriber.calls(), 1);

    fx.controller.shutdown().await;
}

#[tokio::test]
async fn test_volume_toggle_flips_state_cleanly() {
    let fx = fixture(FixedTranscriber::ok("anything"));

    assert!(fx.controller.toggle_volume_monitor().await.unwrap());
    assert!(fx.controller.snapshot().await.volume_monitor_active);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(fx.sink.applies.load(Ordering::SeqCst) > 0);

    assert!(!fx.controller.toggle_volume_monitor().await.unwrap());
    assert!(!fx.controller.snapshot().await.volume_monitor_active);

    // The joined monitor must not tick again.
    let after = fx.sink.applies.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(fx.sink.applies.load(Ordering::SeqCst), after);

    fx.controller.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_cleans_up_and_clears_topics() {
    let fx = fixture(FixedTranscriber::ok("anything"));

    fx.controller.record().await.unwrap();
    fx.controller.toggle_volume_monitor().await.unwrap();

    fx.controller.shutdown().await;

    let snapshot = fx.controller.snapshot().await;
    assert!(!snapshot.recording);
    assert!(!snapshot.volume_monitor_active);
    assert!(snapshot.closed);

    // The cleared topics are the final observable messages.
    assert_eq!(fx.publisher.last_on(Channel::Status), Some(String::new()));
    assert_eq!(fx.publisher.last_on(Channel::Query), Some(String::new()));

    // Closed operations are typed no-ops.
    assert_eq!(fx.controller.record().await.unwrap(), RecordOutcome::Closed);
    assert_eq!(
        fx.controller.stop_and_transcribe().await.unwrap(),
        StopOutcome::Closed
    );
    assert!(!fx.controller.toggle_volume_monitor().await.unwrap());

    // A second shutdown neither acts nor republishes.
    let published = fx.publisher.count();
    fx.controller.shutdown().await;
    assert_eq!(fx.publisher.count(), published);
}

#[tokio::test]
async fn test_playback_runs_to_completion() {
    let fx = fixture(FixedTranscriber::ok("anything"));

    fx.controller.play_back().await.unwrap();

    fx.controller.shutdown().await;
}
