use serde::Deserialize;
use tracing::trace;

use shield_engine::{Image, PixelFormat};

use crate::framesize::FrameSize;
use crate::sensor::{Result, Sensor, SensorSettings, SensorState};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    #[default]
    Gradient,
    Checkerboard,
    ColorBars,
}

const BARS: [(u8, u8, u8); 8] = [
    (255, 255, 255),
    (255, 255, 0),
    (0, 255, 255),
    (0, 255, 0),
    (255, 0, 255),
    (255, 0, 0),
    (0, 0, 255),
    (0, 0, 0),
];

/// Synthetic frames that drift one step per snapshot, for running the
/// stream without a camera attached.
pub struct PatternSensor {
    pattern: Pattern,
    state: SensorState,
    frame_id: u32,
}

impl PatternSensor {
    pub fn new(pattern: Pattern) -> Self {
        PatternSensor {
            pattern,
            state: SensorState::default(),
            frame_id: 0,
        }
    }

    fn rgb_at(&self, x: u32, y: u32, width: u32) -> (u8, u8, u8) {
        let t = self.frame_id;
        match self.pattern {
            Pattern::Gradient => {
                let v = (x + y + t) % 256;
                (v as u8, (x % 256) as u8, (y % 256) as u8)
            }
            Pattern::Checkerboard => {
                if ((x + t) / 16 + y / 16) % 2 == 0 {
                    (255, 255, 255)
                } else {
                    (0, 0, 0)
                }
            }
            Pattern::ColorBars => {
                let bar_w = (width / BARS.len() as u32).max(1);
                let i = (((x + t) % width) / bar_w) as usize;
                BARS[i.min(BARS.len() - 1)]
            }
        }
    }
}

impl Sensor for PatternSensor {
    fn reset(&mut self) -> Result<()> {
        self.state.reset();
        self.frame_id = 0;
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
        let (w, h) = settings.framesize.dimensions();
        let mut rgb = Vec::with_capacity(w as usize * h as usize * 3);
        for y in 0..h {
            for x in 0..w {
                let (r, g, b) = self.rgb_at(x, y, w);
                rgb.extend_from_slice(&[r, g, b]);
            }
        }
        let frame = Image::from_raw(
            w,
            h,
            PixelFormat::Rgb565,
            shield_engine::convert::rgb888_buf_to_rgb565(&rgb),
        )?
        .convert_to(settings.pixformat)?;
        trace!("Pattern frame {}: {:?}", self.frame_id, frame);
        self.frame_id = self.frame_id.wrapping_add(1);
        Ok(frame)
    }

    fn settings(&self) -> Option<SensorSettings> {
        self.state.get()
    }
}
