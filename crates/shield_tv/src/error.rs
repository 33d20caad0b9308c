use thiserror::Error;

use shield_engine::EngineError;

pub type Result<T> = std::result::Result<T, TvError>;

#[derive(Error, Debug)]
pub enum TvError {
    #[error("TV output used before init")]
    NotInitialized,

    #[error("invalid channel {0}, expected 1..=8")]
    InvalidChannel(u8),

    #[error("display scale must be finite and positive, got {x_scale}x{y_scale}")]
    InvalidScale { x_scale: f32, y_scale: f32 },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("snapshot encode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
