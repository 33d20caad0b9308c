use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use shield_engine::{EngineError, Image, PixelFormat};

use crate::framesize::FrameSize;

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("sensor used before reset")]
    NotReset,

    #[error("unsupported sensor configuration: {0}")]
    Unsupported(String),

    #[error("frame length mismatch: expected {expected} bytes, got {actual}")]
    FrameLength { expected: usize, actual: usize },

    #[error("no still images found in {0}")]
    NoStills(PathBuf),

    #[error("camera device error: {0}")]
    Device(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SensorError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorSettings {
    pub pixformat: PixelFormat,
    pub framesize: FrameSize,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            pixformat: PixelFormat::Rgb565,
            framesize: FrameSize::Qvga,
        }
    }
}

/// A camera that produces one frame per `snapshot` call.
///
/// `reset` must come first; every other call fails with
/// [`SensorError::NotReset`] until it has.
pub trait Sensor {
    fn reset(&mut self) -> Result<()>;
    fn set_pixformat(&mut self, format: PixelFormat) -> Result<()>;
    fn set_framesize(&mut self, size: FrameSize) -> Result<()>;
    /// Blocks until a frame in the current settings is available.
    fn snapshot(&mut self) -> Result<Image>;
    fn settings(&self) -> Option<SensorSettings>;
}

/// Bookkeeping shared by the backends.
#[derive(Debug, Default)]
pub struct SensorState {
    settings: Option<SensorSettings>,
}

impl SensorState {
    pub fn reset(&mut self) {
        let settings = SensorSettings::default();
        info!(
            "Sensor reset ({} {})",
            settings.pixformat, settings.framesize
        );
        self.settings = Some(settings);
    }

    pub fn current(&self) -> Result<SensorSettings> {
        self.settings.ok_or(SensorError::NotReset)
    }

    pub fn get(&self) -> Option<SensorSettings> {
        self.settings
    }

    /// Returns true when the value changed.
    pub fn set_pixformat(&mut self, format: PixelFormat) -> Result<bool> {
        let settings = self.settings.as_mut().ok_or(SensorError::NotReset)?;
        debug!("Pixel format {} -> {}", settings.pixformat, format);
        let changed = settings.pixformat != format;
        settings.pixformat = format;
        Ok(changed)
    }

    /// Returns true when the value changed.
    pub fn set_framesize(&mut self, size: FrameSize) -> Result<bool> {
        let settings = self.settings.as_mut().ok_or(SensorError::NotReset)?;
        debug!("Frame size {} -> {}", settings.framesize, size);
        let changed = settings.framesize != size;
        settings.framesize = size;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_requires_reset() {
        let mut state = SensorState::default();
        assert!(matches!(state.current(), Err(SensorError::NotReset)));
        assert!(matches!(
            state.set_pixformat(PixelFormat::Grayscale),
            Err(SensorError::NotReset)
        ));
        assert!(matches!(
            state.set_framesize(FrameSize::Qqvga),
            Err(SensorError::NotReset)
        ));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = SensorState::default();
        state.reset();
        assert!(state.set_framesize(FrameSize::Vga).unwrap());
        assert!(!state.set_framesize(FrameSize::Vga).unwrap());
        state.reset();
        assert_eq!(state.current().unwrap(), SensorSettings::default());
    }
}
