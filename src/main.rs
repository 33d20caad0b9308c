use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tv_shield::{load_settings, run, setup};

const SETTINGS_PATH: &str = "settings.toml";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| SETTINGS_PATH.to_string());
    let settings = load_settings(&path).with_context(|| format!("loading {}", path))?;
    info!("Starting with {}", path);

    let mut sensor = settings.sensor.open().context("opening the sensor")?;
    let mut tv = settings.tv.open().context("opening the TV output")?;

    setup(sensor.as_mut(), &mut tv, &settings.stream_setup())?;
    match run(sensor.as_mut(), &mut tv)? {}
}
