//! Volume monitoring
//!
//! A periodic loop reads a normalized sample from the volume sensor,
//! maps it onto the output range, and applies it through the system
//! mixer. The loop is owned by the session controller through a
//! `MonitorHandle` and cancelled cooperatively.

pub mod monitor;
pub mod sensor;
pub mod sink;

pub use monitor::{applied_level, display_level, MonitorHandle, MonitorSettings};
pub use sensor::{detect, AdcSensor, SensorSettings, VolumeSensor};
pub use sink::{MixerSettings, MixerSink, VolumeSink};
