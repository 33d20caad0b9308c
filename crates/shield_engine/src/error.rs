use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("operation not supported on JPEG images")]
    Compressed,

    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("unknown pixel format '{0}'")]
    UnknownFormat(String),

    #[error("unsupported JPEG stream: {0}")]
    UnsupportedJpeg(String),

    #[error("JPEG decode error: {0}")]
    Jpeg(#[from] jpeg_decoder::Error),

    #[error("image codec error: {0}")]
    Codec(#[from] ::image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
