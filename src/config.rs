use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::bus::Topics;
use crate::capture::{CaptureSettings, PlaybackSettings};
use crate::daemon::DaemonSettings;
use crate::session::ControllerSettings;
use crate::transcribe::TranscriberSettings;
use crate::volume::{MixerSettings, MonitorSettings, SensorSettings};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub bus: BusConfig,
    pub capture: CaptureConfig,
    pub playback: PlaybackConfig,
    pub transcriber: TranscriberConfig,
    pub volume: VolumeConfig,
    pub daemon: DaemonConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct BusConfig {
    pub url: String,
    pub control_topic: String,
    pub status_topic: String,
    pub query_topic: String,
}

#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    pub program: String,
    pub device: String,
    pub sample_rate: u32,
    pub format: String,
    pub channels: u16,
    pub artifact_path: String,
    pub stop_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct PlaybackConfig {
    pub program: String,
    pub device: String,
}

#[derive(Debug, Deserialize)]
pub struct TranscriberConfig {
    pub binary: String,
    pub model_path: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct VolumeConfig {
    pub sensor_path: String,
    pub full_scale: f32,
    pub tick_ms: u64,
    pub join_timeout_ms: u64,
    pub mixer_program: String,
    pub mixer_control: String,
    pub mixer_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct DaemonConfig {
    pub enabled: bool,
    pub program: String,
    pub args: Vec<String>,
    pub startup_grace_ms: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn topics(&self) -> Topics {
        Topics {
            control: self.bus.control_topic.clone(),
            status: self.bus.status_topic.clone(),
            query: self.bus.query_topic.clone(),
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            capture: CaptureSettings {
                program: self.capture.program.clone(),
                device: self.capture.device.clone(),
                sample_rate: self.capture.sample_rate,
                format: self.capture.format.clone(),
                channels: self.capture.channels,
                artifact: expand(&self.capture.artifact_path),
                stop_timeout: Duration::from_millis(self.capture.stop_timeout_ms),
            },
            playback: PlaybackSettings {
                program: self.playback.program.clone(),
                device: self.playback.device.clone(),
            },
            monitor: MonitorSettings {
                tick: Duration::from_millis(self.volume.tick_ms),
                join_timeout: Duration::from_millis(self.volume.join_timeout_ms),
            },
        }
    }

    pub fn transcriber_settings(&self) -> TranscriberSettings {
        TranscriberSettings {
            binary: self.transcriber.binary.clone(),
            model: expand(&self.transcriber.model_path),
            timeout: Duration::from_millis(self.transcriber.timeout_ms),
        }
    }

    pub fn sensor_settings(&self) -> SensorSettings {
        SensorSettings {
            path: expand(&self.volume.sensor_path),
            full_scale: self.volume.full_scale,
        }
    }

    pub fn mixer_settings(&self) -> MixerSettings {
        MixerSettings {
            program: self.volume.mixer_program.clone(),
            control: self.volume.mixer_control.clone(),
            timeout: Duration::from_millis(self.volume.mixer_timeout_ms),
        }
    }

    pub fn daemon_settings(&self) -> DaemonSettings {
        DaemonSettings {
            enabled: self.daemon.enabled,
            program: self.daemon.program.clone(),
            args: self.daemon.args.clone(),
            startup_grace: Duration::from_millis(self.daemon.startup_grace_ms),
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
