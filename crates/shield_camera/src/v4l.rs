use rscam::{Camera, Config};
use tracing::{debug, info, trace};

use shield_engine::{convert, Image, PixelFormat};

use crate::framesize::FrameSize;
use crate::sensor::{Result, Sensor, SensorError, SensorSettings, SensorState};

/// A V4L2 camera. Raw formats are captured as YUYV and converted, JPEG
/// is captured as MJPG.
///
/// The stream is started lazily by `snapshot`; changing the pixel format or
/// frame size closes it so the next snapshot reopens with the new settings.
pub struct V4lSensor {
    device: String,
    interval: (u32, u32),
    camera: Option<Camera>,
    state: SensorState,
}

impl V4lSensor {
    pub fn new(device: &str, interval: (u32, u32)) -> Self {
        V4lSensor {
            device: device.to_string(),
            interval,
            camera: None,
            state: SensorState::default(),
        }
    }

    fn fourcc(format: PixelFormat) -> &'static [u8] {
        match format {
            PixelFormat::Jpeg => b"MJPG",
            PixelFormat::Rgb565 | PixelFormat::Grayscale => b"YUYV",
        }
    }

    fn start(&mut self, settings: SensorSettings) -> Result<&mut Camera> {
        if self.camera.is_none() {
            let (w, h) = settings.framesize.dimensions();
            let mut camera = Camera::new(&self.device)?;
            camera
                .start(&Config {
                    interval: self.interval,
                    resolution: (w, h),
                    format: Self::fourcc(settings.pixformat),
                    ..Default::default()
                })
                .map_err(|e| SensorError::Device(e.to_string()))?;
            info!(
                "Streaming {} at {}x{} ({})",
                self.device, w, h, settings.pixformat
            );
            self.camera = Some(camera);
        }
        let device = &self.device;
        self.camera
            .as_mut()
            .ok_or_else(|| SensorError::Device(format!("{} is not open", device)))
    }

    fn close(&mut self) {
        if self.camera.take().is_some() {
            debug!("Closed {}", self.device);
        }
    }
}

impl Sensor for V4lSensor {
    fn reset(&mut self) -> Result<()> {
        self.close();
        self.state.reset();
        Ok(())
    }

    fn set_pixformat(&mut self, format: PixelFormat) -> Result<()> {
        if self.state.set_pixformat(format)? {
            self.close();
        }
        Ok(())
    }

    fn set_framesize(&mut self, size: FrameSize) -> Result<()> {
        if self.state.set_framesize(size)? {
            self.close();
        }
        Ok(())
    }

    fn snapshot(&mut self) -> Result<Image> {
        let settings = self.state.current()?;
        let (w, h) = settings.framesize.dimensions();
        let frame = self.start(settings)?.capture()?;
        trace!("Captured {} bytes", frame.len());

        if settings.pixformat == PixelFormat::Jpeg {
            return Ok(Image::from_jpeg(frame.to_vec())?);
        }

        let expected = w as usize * h as usize * 2;
        if frame.len() != expected {
            return Err(SensorError::FrameLength {
                expected,
                actual: frame.len(),
            });
        }
        let data = match settings.pixformat {
            PixelFormat::Grayscale => convert::yuyv_to_grayscale(&frame),
            _ => convert::yuyv_to_rgb565(&frame),
        };
        Ok(Image::from_raw(w, h, settings.pixformat, data)?)
    }

    fn settings(&self) -> Option<SensorSettings> {
        self.state.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_requires_reset_before_touching_the_device() {
        let mut sensor = V4lSensor::new("/dev/does-not-exist", (1, 30));
        assert!(matches!(sensor.snapshot(), Err(SensorError::NotReset)));
    }

    #[test]
    fn missing_device_surfaces_as_io_error() {
        let mut sensor = V4lSensor::new("/dev/does-not-exist", (1, 30));
        sensor.reset().unwrap();
        sensor.set_framesize(FrameSize::Qqvga).unwrap();
        assert!(matches!(sensor.snapshot(), Err(SensorError::Io(_))));
    }
}
