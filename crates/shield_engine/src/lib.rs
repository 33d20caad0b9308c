//! Image model and pixel plumbing shared by the sensor and TV crates.

pub mod blit;
pub mod convert;
pub mod error;
pub mod image;
pub mod io;

pub use crate::error::{EngineError, Result};
pub use crate::image::{Image, Pixel, PixelFormat};
