use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use shield_engine::{blit, io, Image, PixelFormat};

use crate::framesize::FrameSize;
use crate::sensor::{Result, Sensor, SensorError, SensorSettings, SensorState};

const EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "pgm", "ppm"];

/// Replays image files from a directory in name order, looping forever.
pub struct StillSensor {
    paths: Vec<PathBuf>,
    next: usize,
    state: SensorState,
}

impl StillSensor {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect::<Vec<_>>();
        if paths.is_empty() {
            return Err(SensorError::NoStills(dir.to_path_buf()));
        }
        paths.sort();
        info!("Replaying {} stills from {}", paths.len(), dir.display());
        Ok(StillSensor {
            paths,
            next: 0,
            state: SensorState::default(),
        })
    }
}

impl Sensor for StillSensor {
    fn reset(&mut self) -> Result<()> {
        self.state.reset();
        self.next = 0;
        Ok(())
    }

    fn set_pixformat(&mut self, format: PixelFormat) -> Result<()> {
        self.state.set_pixformat(format)?;
        Ok(())
    }

    fn set_framesize(&mut self, size: FrameSize) -> Result<()> {
        self.state.set_framesize(size)?;
        Ok(())
    }

    fn snapshot(&mut self) -> Result<Image> {
        let settings = self.state.current()?;
        let path = &self.paths[self.next];
        self.next = (self.next + 1) % self.paths.len();
        debug!("Loading still {}", path.display());

        let (w, h) = settings.framesize.dimensions();
        let raw_format = match settings.pixformat {
            PixelFormat::Grayscale => PixelFormat::Grayscale,
            _ => PixelFormat::Rgb565,
        };
        let loaded = io::load_image(path, raw_format)?;
        let frame = blit::resize_nearest(&loaded, w, h)?.convert_to(settings.pixformat)?;
        Ok(frame)
    }

    fn settings(&self) -> Option<SensorSettings> {
        self.state.get()
    }
}
