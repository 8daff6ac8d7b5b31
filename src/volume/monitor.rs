use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::sensor::VolumeSensor;
use super::sink::VolumeSink;

/// Display value shown on dashboards, 0-100.
pub fn display_level(sample: f32) -> u8 {
    (sample.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Level actually applied to the output, 9-100.
///
/// The offset keeps the actuator out of its dead zone at the low end of
/// its range; a device-specific calibration, not an approximation.
pub fn applied_level(sample: f32) -> u8 {
    (sample.clamp(0.0, 1.0) * 91.0).round() as u8 + 9
}

/// Settings for the monitor loop.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Interval between sensor reads
    pub tick: Duration,
    /// Ceiling on waiting for the loop to exit after cancellation;
    /// must exceed one tick so a mid-sleep loop can observe the flag
    pub join_timeout: Duration,
}

/// Handle to a running volume monitor task.
///
/// Stopping is cooperative: the loop checks the flag once per tick, so
/// it exits within one tick period of cancellation, and `stop` joins
/// it so the caller deterministically observes full termination.
pub struct MonitorHandle {
    stop_flag: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Spawn the monitor loop.
    pub fn spawn(
        sensor: Arc<dyn VolumeSensor>,
        sink: Arc<dyn VolumeSink>,
        tick: Duration,
    ) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop_flag);

        let task = tokio::spawn(async move {
            run_loop(sensor, sink, tick, flag).await;
        });

        Self { stop_flag, task }
    }

    /// Cancel the loop and wait up to `join_timeout` for it to exit.
    /// Returns true when the task was observed to finish cleanly.
    pub async fn stop(mut self, join_timeout: Duration) -> bool {
        self.stop_flag.store(true, Ordering::SeqCst);

        match tokio::time::timeout(join_timeout, &mut self.task).await {
            Ok(Ok(())) => {
                debug!("Volume monitor joined");
                true
            }
            Ok(Err(e)) => {
                error!("Volume monitor task panicked: {e}");
                false
            }
            Err(_) => {
                error!(?join_timeout, "Volume monitor did not stop in time, aborting");
                self.task.abort();
                false
            }
        }
    }
}

async fn run_loop(
    sensor: Arc<dyn VolumeSensor>,
    sink: Arc<dyn VolumeSink>,
    tick: Duration,
    stop_flag: Arc<AtomicBool>,
) {
    info!("Volume monitoring started");

    let mut ticker = tokio::time::interval(tick);

    loop {
        ticker.tick().await;

        if stop_flag.load(Ordering::SeqCst) {
            break;
        }

        match sensor.read().await {
            Ok(sample) => {
                let applied = applied_level(sample);

                // One failed tick must not kill monitoring.
                if let Err(e) = sink.apply(applied).await {
                    warn!("Failed to apply volume level: {e}");
                } else {
                    trace!(display = display_level(sample), applied, "Applied volume");
                }
            }
            Err(e) => {
                warn!("Volume sensor read failed: {e}");
            }
        }
    }

    info!("Volume monitoring stopped");
}
