//! Camera sensors: the `Sensor` trait, frame size presets and the backends
//! that produce frames on a host machine.

pub mod framesize;
pub mod pattern;
pub mod sensor;
pub mod still;
#[cfg(target_os = "linux")]
pub mod v4l;

pub use framesize::FrameSize;
pub use pattern::{Pattern, PatternSensor};
pub use sensor::{Sensor, SensorError, SensorSettings, SensorState};
pub use shield_engine::{Image, Pixel, PixelFormat};
pub use still::StillSensor;
#[cfg(target_os = "linux")]
pub use v4l::V4lSensor;
