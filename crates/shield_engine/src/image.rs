use ::image::codecs::jpeg::JpegEncoder;
use ::image::ExtendedColorType;
use serde::Deserialize;
use std::{fmt, str::FromStr};

use crate::convert;
use crate::error::{EngineError, Result};

pub const DEFAULT_JPEG_QUALITY: u8 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum PixelFormat {
    /// 16 bit colour, stored little-endian.
    Rgb565,
    Grayscale,
    Jpeg,
}

impl PixelFormat {
    /// `None` for compressed formats.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            PixelFormat::Rgb565 => Some(2),
            PixelFormat::Grayscale => Some(1),
            PixelFormat::Jpeg => None,
        }
    }
}

impl FromStr for PixelFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "RGB565" => Ok(PixelFormat::Rgb565),
            "GRAYSCALE" => Ok(PixelFormat::Grayscale),
            "JPEG" => Ok(PixelFormat::Jpeg),
            _ => Err(EngineError::UnknownFormat(s.to_string())),
        }
    }
}

impl TryFrom<String> for PixelFormat {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Rgb565 => "RGB565",
            PixelFormat::Grayscale => "GRAYSCALE",
            PixelFormat::Jpeg => "JPEG",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pixel {
    Gray(u8),
    Rgb(u8, u8, u8),
}

impl Pixel {
    pub fn luma(self) -> u8 {
        match self {
            Pixel::Gray(v) => v,
            Pixel::Rgb(r, g, b) => convert::rgb_to_luma(r, g, b),
        }
    }

    pub fn to_rgb565(self) -> u16 {
        match self {
            Pixel::Gray(v) => convert::rgb888_to_rgb565(v, v, v),
            Pixel::Rgb(r, g, b) => convert::rgb888_to_rgb565(r, g, b),
        }
    }
}

/// A single frame: dimensions, pixel format and the backing buffer.
///
/// Raw formats hold exactly `width * height * bpp` bytes. JPEG images hold the
/// compressed stream, so `size()` is the stream length.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Image {
    /// Zeroed raw image.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let bpp = format.bytes_per_pixel().ok_or(EngineError::Compressed)?;
        Ok(Image {
            width,
            height,
            format,
            data: vec![0; width as usize * height as usize * bpp],
        })
    }

    pub fn from_raw(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let bpp = format.bytes_per_pixel().ok_or(EngineError::Compressed)?;
        let expected = width as usize * height as usize * bpp;
        if data.len() != expected {
            return Err(EngineError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Image {
            width,
            height,
            format,
            data,
        })
    }

    /// Wraps a JPEG stream, reading the dimensions from its header.
    pub fn from_jpeg(data: Vec<u8>) -> Result<Self> {
        let mut decoder = jpeg_decoder::Decoder::new(data.as_slice());
        decoder.read_info()?;
        let info = decoder
            .info()
            .ok_or_else(|| EngineError::UnsupportedJpeg("missing header".to_string()))?;
        Ok(Image {
            width: info.width as u32,
            height: info.height as u32,
            format: PixelFormat::Jpeg,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn is_compressed(&self) -> bool {
        self.format == PixelFormat::Jpeg
    }

    /// Buffer size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel()?;
        Some((y as usize * self.width as usize + x as usize) * bpp)
    }

    /// `Ok(None)` when the coordinates fall outside the image.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Option<Pixel>> {
        if self.is_compressed() {
            return Err(EngineError::Compressed);
        }
        let Some(i) = self.offset(x, y) else {
            return Ok(None);
        };
        let pixel = match self.format {
            PixelFormat::Grayscale => Pixel::Gray(self.data[i]),
            _ => {
                let (r, g, b) =
                    convert::rgb565_to_rgb888(u16::from_le_bytes([self.data[i], self.data[i + 1]]));
                Pixel::Rgb(r, g, b)
            }
        };
        Ok(Some(pixel))
    }

    /// Writes outside the image are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) -> Result<()> {
        if self.is_compressed() {
            return Err(EngineError::Compressed);
        }
        let Some(i) = self.offset(x, y) else {
            return Ok(());
        };
        match self.format {
            PixelFormat::Grayscale => self.data[i] = pixel.luma(),
            _ => self.data[i..i + 2].copy_from_slice(&pixel.to_rgb565().to_le_bytes()),
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        if self.is_compressed() {
            return Err(EngineError::Compressed);
        }
        self.data.fill(0);
        Ok(())
    }

    /// JPEG-encodes a raw image. Quality is clamped to 1..=100.
    /// A JPEG image is returned unchanged.
    pub fn compress(&self, quality: u8) -> Result<Image> {
        let (pixels, color) = match self.format {
            PixelFormat::Jpeg => return Ok(self.clone()),
            PixelFormat::Grayscale => (self.data.clone(), ExtendedColorType::L8),
            PixelFormat::Rgb565 => (convert::rgb565_buf_to_rgb888(&self.data), ExtendedColorType::Rgb8),
        };
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).encode(
            &pixels,
            self.width,
            self.height,
            color,
        )?;
        Ok(Image {
            width: self.width,
            height: self.height,
            format: PixelFormat::Jpeg,
            data: out,
        })
    }

    /// Decodes a JPEG image: grayscale streams stay grayscale, colour streams
    /// become RGB565. Raw images are returned unchanged.
    pub fn decompress(&self) -> Result<Image> {
        if !self.is_compressed() {
            return Ok(self.clone());
        }
        let mut decoder = jpeg_decoder::Decoder::new(self.data.as_slice());
        let pixels = decoder.decode()?;
        let info = decoder
            .info()
            .ok_or_else(|| EngineError::UnsupportedJpeg("missing header".to_string()))?;
        let (w, h) = (info.width as u32, info.height as u32);
        match info.pixel_format {
            jpeg_decoder::PixelFormat::L8 => Image::from_raw(w, h, PixelFormat::Grayscale, pixels),
            jpeg_decoder::PixelFormat::RGB24 => Image::from_raw(
                w,
                h,
                PixelFormat::Rgb565,
                convert::rgb888_buf_to_rgb565(&pixels),
            ),
            other => Err(EngineError::UnsupportedJpeg(format!("{:?}", other))),
        }
    }

    pub fn to_rgb565(&self) -> Result<Image> {
        match self.format {
            PixelFormat::Rgb565 => Ok(self.clone()),
            PixelFormat::Grayscale => Image::from_raw(
                self.width,
                self.height,
                PixelFormat::Rgb565,
                convert::gray_buf_to_rgb565(&self.data),
            ),
            PixelFormat::Jpeg => self.decompress()?.to_rgb565(),
        }
    }

    pub fn to_grayscale(&self) -> Result<Image> {
        match self.format {
            PixelFormat::Grayscale => Ok(self.clone()),
            PixelFormat::Rgb565 => Image::from_raw(
                self.width,
                self.height,
                PixelFormat::Grayscale,
                convert::rgb565_buf_to_gray(&self.data),
            ),
            PixelFormat::Jpeg => self.decompress()?.to_grayscale(),
        }
    }

    /// Converts to `format`, compressing with the default quality for JPEG.
    pub fn convert_to(&self, format: PixelFormat) -> Result<Image> {
        match format {
            PixelFormat::Rgb565 => self.to_rgb565(),
            PixelFormat::Grayscale => self.to_grayscale(),
            PixelFormat::Jpeg => self.compress(DEFAULT_JPEG_QUALITY),
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<image width:{} height:{} format:{} size:{}>",
            self.width,
            self.height,
            self.format,
            self.size()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pixel_formats_case_insensitively() {
        assert_eq!("rgb565".parse::<PixelFormat>().unwrap(), PixelFormat::Rgb565);
        assert_eq!("GrayScale".parse::<PixelFormat>().unwrap(), PixelFormat::Grayscale);
        assert_eq!("JPEG".parse::<PixelFormat>().unwrap(), PixelFormat::Jpeg);
        assert!("BAYER".parse::<PixelFormat>().is_err());
    }

    #[test]
    fn raw_image_size_follows_bpp() {
        let rgb = Image::new(160, 120, PixelFormat::Rgb565).unwrap();
        assert_eq!(rgb.size(), 160 * 120 * 2);
        let gray = Image::new(160, 120, PixelFormat::Grayscale).unwrap();
        assert_eq!(gray.size(), 160 * 120);
        assert!(Image::new(160, 120, PixelFormat::Jpeg).is_err());
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = Image::from_raw(4, 4, PixelFormat::Grayscale, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::BufferSize {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn pixel_access_outside_is_none() {
        let mut img = Image::new(4, 3, PixelFormat::Grayscale).unwrap();
        assert_eq!(img.get_pixel(4, 0).unwrap(), None);
        assert_eq!(img.get_pixel(0, 3).unwrap(), None);
        img.set_pixel(10, 10, Pixel::Gray(9)).unwrap();
        assert!(img.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn rgb565_pixels_expand_like_the_firmware() {
        let mut img = Image::new(2, 2, PixelFormat::Rgb565).unwrap();
        img.set_pixel(1, 1, Pixel::Rgb(255, 255, 255)).unwrap();
        assert_eq!(img.get_pixel(1, 1).unwrap(), Some(Pixel::Rgb(255, 255, 255)));

        img.set_pixel(0, 1, Pixel::Rgb(128, 128, 128)).unwrap();
        // 128 >> 3 = 16 -> (16 * 255 + 15) / 31 = 132; 128 >> 2 = 32 -> (32 * 255 + 31) / 63 = 130
        assert_eq!(img.get_pixel(0, 1).unwrap(), Some(Pixel::Rgb(132, 130, 132)));
        assert_eq!(&img.as_bytes()[4..6], &[0x10, 0x84]);
    }

    #[test]
    fn colour_written_to_grayscale_becomes_luma() {
        let mut img = Image::new(1, 1, PixelFormat::Grayscale).unwrap();
        img.set_pixel(0, 0, Pixel::Rgb(255, 255, 255)).unwrap();
        assert_eq!(img.get_pixel(0, 0).unwrap(), Some(Pixel::Gray(255)));
    }

    #[test]
    fn clear_zeroes() {
        let mut img = Image::from_raw(2, 1, PixelFormat::Grayscale, vec![7, 8]).unwrap();
        img.clear().unwrap();
        assert_eq!(img.as_bytes(), &[0, 0]);
    }

    #[test]
    fn compress_then_decompress_keeps_dimensions() {
        let mut img = Image::new(16, 8, PixelFormat::Rgb565).unwrap();
        for x in 0..16 {
            img.set_pixel(x, 3, Pixel::Rgb(200, 40, 10)).unwrap();
        }
        let jpeg = img.compress(90).unwrap();
        assert!(jpeg.is_compressed());
        assert_eq!((jpeg.width(), jpeg.height()), (16, 8));
        assert_eq!(jpeg.size(), jpeg.as_bytes().len());
        assert!(matches!(jpeg.get_pixel(0, 0), Err(EngineError::Compressed)));

        let header_only = Image::from_jpeg(jpeg.as_bytes().to_vec()).unwrap();
        assert_eq!((header_only.width(), header_only.height()), (16, 8));

        let back = jpeg.decompress().unwrap();
        assert_eq!(back.format(), PixelFormat::Rgb565);
        assert_eq!(back.size(), 16 * 8 * 2);
    }

    #[test]
    fn grayscale_jpeg_decodes_to_grayscale() {
        let img = Image::from_raw(8, 8, PixelFormat::Grayscale, vec![100; 64]).unwrap();
        let back = img.compress(100).unwrap().decompress().unwrap();
        assert_eq!(back.format(), PixelFormat::Grayscale);
        let Some(Pixel::Gray(v)) = back.get_pixel(4, 4).unwrap() else {
            panic!("expected a gray pixel");
        };
        assert!((v as i16 - 100).abs() <= 2);
    }
}
