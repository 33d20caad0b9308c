//! Streams camera snapshots to a TV shield: configure the sensor once, set up
//! the TV output, then display frames forever.

pub mod config;
pub mod stream;

pub use config::{load_settings, ConfigError, Settings};
pub use stream::{run, setup, StreamError, StreamSetup};
