use std::convert::Infallible;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

use shield_camera::{FrameSize, PixelFormat, Sensor, SensorError};
use shield_tv::{Channel, TvConfig, TvError, TvOutput};

const REPORT_EVERY: u64 = 300;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("sensor setup failed: {0}")]
    SensorSetup(#[source] SensorError),

    #[error("TV setup failed: {0}")]
    TvSetup(#[source] TvError),

    #[error("capture failed after {frames} frames: {source}")]
    Capture {
        frames: u64,
        #[source]
        source: SensorError,
    },

    #[error("display failed after {frames} frames: {source}")]
    Display {
        frames: u64,
        #[source]
        source: TvError,
    },
}

/// The one-time configuration applied before streaming.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamSetup {
    pub pixformat: PixelFormat,
    pub framesize: FrameSize,
    pub tv: TvConfig,
    pub channel: Channel,
}

/// Reset and configure the sensor, then bring up the TV output and tune
/// its channel. Stops at the first failure.
pub fn setup<S, T>(sensor: &mut S, tv: &mut T, config: &StreamSetup) -> Result<(), StreamError>
where
    S: Sensor + ?Sized,
    T: TvOutput + ?Sized,
{
    sensor.reset().map_err(StreamError::SensorSetup)?;
    sensor
        .set_pixformat(config.pixformat)
        .map_err(StreamError::SensorSetup)?;
    sensor
        .set_framesize(config.framesize)
        .map_err(StreamError::SensorSetup)?;
    info!("Sensor ready: {} {}", config.pixformat, config.framesize);

    tv.init(&config.tv).map_err(StreamError::TvSetup)?;
    tv.channel(config.channel).map_err(StreamError::TvSetup)?;
    info!("TV ready on channel {}", config.channel);
    Ok(())
}

/// Captures a frame and displays it, forever. Only returns on the first
/// capture or display error.
pub fn run<S, T>(sensor: &mut S, tv: &mut T) -> Result<Infallible, StreamError>
where
    S: Sensor + ?Sized,
    T: TvOutput + ?Sized,
{
    let mut frames: u64 = 0;
    let mut window = Instant::now();
    loop {
        let frame = sensor
            .snapshot()
            .map_err(|source| StreamError::Capture { frames, source })?;
        tv.display(&frame)
            .map_err(|source| StreamError::Display { frames, source })?;
        frames += 1;

        if frames % REPORT_EVERY == 0 {
            let fps = REPORT_EVERY as f64 / window.elapsed().as_secs_f64();
            debug!("{} frames displayed, {:.1} fps", frames, fps);
            window = Instant::now();
        }
    }
}
