use ::image::{GrayImage, ImageReader, RgbImage};
use std::{fs, path::Path};
use tracing::debug;

use crate::convert;
use crate::error::{EngineError, Result};
use crate::image::{Image, PixelFormat, DEFAULT_JPEG_QUALITY};

/// Writes an image to disk. The file type follows the extension; JPEG
/// images are written as-is.
pub fn save_image<P: AsRef<Path>>(image: &Image, path: P) -> Result<()> {
    let path = path.as_ref();
    debug!("Saving {:?} to {}", image, path.display());
    let (w, h) = (image.width(), image.height());
    let buffer_error = || EngineError::BufferSize {
        expected: w as usize * h as usize,
        actual: image.size(),
    };
    match image.format() {
        PixelFormat::Jpeg => fs::write(path, image.as_bytes())?,
        PixelFormat::Grayscale => GrayImage::from_raw(w, h, image.as_bytes().to_vec())
            .ok_or_else(buffer_error)?
            .save(path)?,
        PixelFormat::Rgb565 => RgbImage::from_raw(w, h, convert::rgb565_buf_to_rgb888(image.as_bytes()))
            .ok_or_else(buffer_error)?
            .save(path)?,
    }
    Ok(())
}

pub fn load_image<P: AsRef<Path>>(path: P, format: PixelFormat) -> Result<Image> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let (w, h) = (img.width(), img.height());
    match format {
        PixelFormat::Grayscale => Image::from_raw(w, h, format, img.to_luma8().into_raw()),
        PixelFormat::Rgb565 => Image::from_raw(
            w,
            h,
            format,
            convert::rgb888_buf_to_rgb565(img.to_rgb8().as_raw()),
        ),
        PixelFormat::Jpeg => {
            let rgb = Image::from_raw(
                w,
                h,
                PixelFormat::Rgb565,
                convert::rgb888_buf_to_rgb565(img.to_rgb8().as_raw()),
            )?;
            rgb.compress(DEFAULT_JPEG_QUALITY)
        }
    }
}
