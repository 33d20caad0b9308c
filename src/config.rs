use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

use shield_camera::{FrameSize, Pattern, PatternSensor, PixelFormat, Sensor, SensorError, StillSensor};
use shield_tv::{
    Channel, DisplayOptions, FramebufferSink, NullSink, Sink, SnapshotSink, Tv, TvConfig, TvError,
    TvType,
};

use crate::stream::StreamSetup;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("error reading the settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings cannot be parsed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("settings cannot be parsed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown settings format {}, expected .toml or .json", .0.display())]
    UnknownExtension(PathBuf),

    #[error("invalid [tv.display] settings: {0}")]
    Display(#[source] TvError),
}

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub sensor: CameraSettings,
    #[serde(default)]
    pub tv: TvSettings,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CameraSettings {
    pub pixformat: PixelFormat,
    pub framesize: FrameSize,
    #[serde(default)]
    pub source: SourceSettings,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSettings {
    V4l {
        #[serde(default = "default_device")]
        device: String,
        #[serde(default = "default_interval")]
        interval: (u32, u32),
    },
    Pattern {
        #[serde(default)]
        pattern: Pattern,
    },
    Stills {
        dir: PathBuf,
    },
}

fn default_device() -> String {
    "/dev/video0".to_string()
}

fn default_interval() -> (u32, u32) {
    (1, 30)
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings::V4l {
            device: default_device(),
            interval: default_interval(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TvSettings {
    #[serde(rename = "type")]
    pub tv_type: TvType,
    pub channel: Channel,
    pub triple_buffer: bool,
    pub display: DisplayOptions,
    pub output: OutputSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputSettings {
    Framebuffer {
        path: PathBuf,
    },
    Snapshots {
        dir: PathBuf,
        #[serde(default = "default_every")]
        every: u32,
    },
    #[default]
    Null,
}

fn default_every() -> u32 {
    30
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str::<Settings>(s)?.validated()
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Settings>(s)?.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.tv.display.validate().map_err(ConfigError::Display)?;
        Ok(self)
    }

    pub fn stream_setup(&self) -> StreamSetup {
        StreamSetup {
            pixformat: self.sensor.pixformat,
            framesize: self.sensor.framesize,
            tv: TvConfig {
                tv_type: self.tv.tv_type,
                triple_buffer: self.tv.triple_buffer,
                display: self.tv.display,
            },
            channel: self.tv.channel,
        }
    }
}

impl CameraSettings {
    pub fn open(&self) -> Result<Box<dyn Sensor>, SensorError> {
        debug!("Opening sensor source {:?}", self.source);
        match &self.source {
            SourceSettings::V4l { device, interval } => open_v4l(device, *interval),
            SourceSettings::Pattern { pattern } => Ok(Box::new(PatternSensor::new(*pattern))),
            SourceSettings::Stills { dir } => Ok(Box::new(StillSensor::new(dir)?)),
        }
    }
}

#[cfg(target_os = "linux")]
fn open_v4l(device: &str, interval: (u32, u32)) -> Result<Box<dyn Sensor>, SensorError> {
    Ok(Box::new(shield_camera::V4lSensor::new(device, interval)))
}

#[cfg(not(target_os = "linux"))]
fn open_v4l(_device: &str, _interval: (u32, u32)) -> Result<Box<dyn Sensor>, SensorError> {
    Err(SensorError::Unsupported(
        "V4L2 capture is only available on Linux".to_string(),
    ))
}

impl TvSettings {
    pub fn open(&self) -> Result<Tv, TvError> {
        debug!("Opening TV output {:?}", self.output);
        let sink: Box<dyn Sink> = match &self.output {
            OutputSettings::Framebuffer { path } => Box::new(FramebufferSink::open(path)?),
            OutputSettings::Snapshots { dir, every } => Box::new(SnapshotSink::new(dir, *every)?),
            OutputSettings::Null => Box::new(NullSink),
        };
        Ok(Tv::new(sink))
    }
}

/// Reads settings from a `.toml` or `.json` file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let parse: fn(&str) -> Result<Settings, ConfigError> = match ext.as_deref() {
        Some("toml") => Settings::from_toml_str,
        Some("json") => Settings::from_json_str,
        _ => return Err(ConfigError::UnknownExtension(path.to_path_buf())),
    };
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&s)
}
