use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::VolumeError;

/// Source of normalized volume samples in [0.0, 1.0].
#[async_trait]
pub trait VolumeSensor: Send + Sync {
    async fn read(&self) -> Result<f32, VolumeError>;
}

/// Settings for the ADC channel backing the volume knob.
#[derive(Debug, Clone)]
pub struct SensorSettings {
    /// Sysfs file exposing the raw ADC count, e.g.
    /// "/sys/bus/iio/devices/iio:device0/in_voltage0_raw"
    pub path: PathBuf,
    /// Raw count corresponding to full scale (1023.0 for a 10-bit ADC)
    pub full_scale: f32,
}

/// Sensor reading a raw ADC count from a sysfs channel file and
/// normalizing it by the configured full-scale count.
pub struct AdcSensor {
    settings: SensorSettings,
}

impl AdcSensor {
    pub fn new(settings: SensorSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl VolumeSensor for AdcSensor {
    async fn read(&self) -> Result<f32, VolumeError> {
        let raw = tokio::fs::read_to_string(&self.settings.path)
            .await
            .map_err(|e| {
                VolumeError::Sensor(format!("{}: {e}", self.settings.path.display()))
            })?;

        let count: f32 = raw
            .trim()
            .parse()
            .map_err(|e| VolumeError::Sensor(format!("unparseable sample {raw:?}: {e}")))?;

        Ok((count / self.settings.full_scale).clamp(0.0, 1.0))
    }
}

/// Probe for the sensor at startup with a single read. Returns `None`
/// (and logs) when the hardware is absent, in which case the volume
/// commands report unavailability instead of acting.
pub async fn detect(settings: SensorSettings) -> Option<Arc<dyn VolumeSensor>> {
    let sensor = AdcSensor::new(settings);
    match sensor.read().await {
        Ok(sample) => {
            info!(sample, "Volume sensor detected");
            Some(Arc::new(sensor))
        }
        Err(e) => {
            warn!("Volume sensor not available: {e}");
            None
        }
    }
}
