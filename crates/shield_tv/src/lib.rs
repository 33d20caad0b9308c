//! TV shield output: a 352x240 RGB565 screen fed one frame at a time, with
//! host-side sinks standing in for the wireless transmitter.

pub mod channel;
pub mod error;
pub mod sink;
pub mod tv;

pub use channel::Channel;
pub use error::{Result, TvError};
pub use sink::{FramebufferSink, NullSink, Sink, SnapshotSink};
pub use tv::{Canvas, DisplayOptions, Tv, TvConfig, TvOutput, TvType, TV_HEIGHT, TV_WIDTH};
