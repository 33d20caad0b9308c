use serde::Deserialize;
use tracing::{debug, info, trace};

use shield_engine::blit::{self, DrawOptions};
use shield_engine::{convert, Image};

use crate::channel::Channel;
use crate::error::{Result, TvError};
use crate::sink::Sink;

/// SIF, the NTSC picture the shield transmits.
pub const TV_WIDTH: u32 = 352;
pub const TV_HEIGHT: u32 = 240;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TvType {
    None,
    #[default]
    Shield,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub x: i32,
    pub y: i32,
    pub x_scale: f32,
    pub y_scale: f32,
    /// Scale the frame to the screen (aspect kept) and center it; overrides
    /// the placement fields.
    pub fit: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            x_scale: 1.0,
            y_scale: 1.0,
            fit: false,
        }
    }
}

impl DisplayOptions {
    /// Rejects scales that are zero, negative, NaN or infinite.
    pub fn validate(&self) -> Result<()> {
        let usable = |s: f32| s.is_finite() && s > 0.0;
        if usable(self.x_scale) && usable(self.y_scale) {
            Ok(())
        } else {
            Err(TvError::InvalidScale {
                x_scale: self.x_scale,
                y_scale: self.y_scale,
            })
        }
    }

    fn placement(&self, width: u32, height: u32) -> DrawOptions {
        if self.fit {
            return DrawOptions::fit(width, height, TV_WIDTH, TV_HEIGHT);
        }
        DrawOptions {
            x: self.x,
            y: self.y,
            x_scale: self.x_scale,
            y_scale: self.y_scale,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TvConfig {
    pub tv_type: TvType,
    pub triple_buffer: bool,
    pub display: DisplayOptions,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    pixels: Vec<u16>,
}

impl Canvas {
    pub fn blank() -> Self {
        Canvas {
            pixels: vec![0; TV_WIDTH as usize * TV_HEIGHT as usize],
        }
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= TV_WIDTH || y >= TV_HEIGHT {
            return None;
        }
        Some(self.pixels[(y * TV_WIDTH + x) as usize])
    }

    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_le_bytes()).collect()
    }

    pub fn to_rgb888(&self) -> Vec<u8> {
        convert::rgb565_buf_to_rgb888(&self.to_le_bytes())
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }
}

/// Something that can show frames on a TV: configured once, then fed.
pub trait TvOutput {
    fn init(&mut self, config: &TvConfig) -> Result<()>;
    fn channel(&mut self, channel: Channel) -> Result<()>;
    fn display(&mut self, image: &Image) -> Result<()>;
}

pub struct Tv {
    sink: Box<dyn Sink>,
    config: Option<TvConfig>,
    channel: Option<Channel>,
    buffers: Vec<Canvas>,
    back: usize,
    frames: u64,
}

impl Tv {
    pub fn new(sink: Box<dyn Sink>) -> Self {
        Tv {
            sink,
            config: None,
            channel: None,
            buffers: Vec::new(),
            back: 0,
            frames: 0,
        }
    }

    fn config(&self) -> Result<TvConfig> {
        self.config.ok_or(TvError::NotInitialized)
    }

    fn enabled(&self) -> Result<bool> {
        Ok(self.config()?.tv_type != TvType::None)
    }

    pub fn width(&self) -> u32 {
        TV_WIDTH
    }

    pub fn height(&self) -> u32 {
        TV_HEIGHT
    }

    pub fn tv_type(&self) -> Option<TvType> {
        self.config.map(|c| c.tv_type)
    }

    pub fn channel_number(&self) -> Option<Channel> {
        self.channel
    }

    pub fn frames_displayed(&self) -> u64 {
        self.frames
    }

    /// Draws `image` with explicit placement instead of the configured one.
    pub fn display_with(&mut self, image: &Image, options: &DisplayOptions) -> Result<()> {
        if !self.enabled()? {
            trace!("TV disabled, dropping {:?}", image);
            return Ok(());
        }
        let placement = options.placement(image.width(), image.height());
        let canvas = &mut self.buffers[self.back];
        canvas.clear();
        blit::draw_scaled(image, &mut canvas.pixels, TV_WIDTH, TV_HEIGHT, &placement)?;
        self.sink.present(canvas)?;
        self.back = (self.back + 1) % self.buffers.len();
        self.frames += 1;
        trace!("Displayed frame {}: {:?}", self.frames, image);
        Ok(())
    }

    /// Blanks the screen.
    pub fn clear(&mut self) -> Result<()> {
        if !self.enabled()? {
            return Ok(());
        }
        let canvas = &mut self.buffers[self.back];
        canvas.clear();
        self.sink.present(canvas)?;
        self.back = (self.back + 1) % self.buffers.len();
        Ok(())
    }

    pub fn deinit(&mut self) {
        if self.config.take().is_some() {
            info!("TV output shut down after {} frames", self.frames);
        }
        self.channel = None;
        self.buffers.clear();
        self.back = 0;
    }
}

impl TvOutput for Tv {
    fn init(&mut self, config: &TvConfig) -> Result<()> {
        config.display.validate()?;
        let count = if config.triple_buffer { 3 } else { 1 };
        self.buffers = (0..count).map(|_| Canvas::blank()).collect();
        self.back = 0;
        self.frames = 0;
        self.config = Some(*config);
        info!(
            "TV init: {:?}, {}x{}, {} buffer(s)",
            config.tv_type, TV_WIDTH, TV_HEIGHT, count
        );
        Ok(())
    }

    fn channel(&mut self, channel: Channel) -> Result<()> {
        if self.enabled()? {
            self.sink.select_channel(channel)?;
        } else {
            debug!("TV disabled, ignoring channel {}", channel);
        }
        self.channel = Some(channel);
        Ok(())
    }

    fn display(&mut self, image: &Image) -> Result<()> {
        let options = self.config()?.display;
        self.display_with(image, &options)
    }
}
