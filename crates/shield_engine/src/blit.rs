//! Nearest-neighbour scaling, used by the TV canvas and by still replay.

use crate::convert;
use crate::error::{EngineError, Result};
use crate::image::{Image, PixelFormat};

/// Placement of a frame on a destination surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawOptions {
    pub x: i32,
    pub y: i32,
    pub x_scale: f32,
    pub y_scale: f32,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            x_scale: 1.0,
            y_scale: 1.0,
        }
    }
}

impl DrawOptions {
    /// Scale so the source fits inside the destination, aspect kept and
    /// letterboxed, and center it.
    pub fn fit(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Self {
        if src_w == 0 || src_h == 0 {
            return Self::default();
        }
        let scale = f32::min(dst_w as f32 / src_w as f32, dst_h as f32 / src_h as f32);
        let out_w = (src_w as f32 * scale).round() as i32;
        let out_h = (src_h as f32 * scale).round() as i32;
        Self {
            x: (dst_w as i32 - out_w) / 2,
            y: (dst_h as i32 - out_h) / 2,
            x_scale: scale,
            y_scale: scale,
        }
    }
}

fn sample_rgb565(src: &Image, x: u32, y: u32) -> u16 {
    let bytes = src.as_bytes();
    let i = y as usize * src.width() as usize + x as usize;
    match src.format() {
        PixelFormat::Grayscale => {
            let v = bytes[i];
            convert::rgb888_to_rgb565(v, v, v)
        }
        _ => u16::from_le_bytes([bytes[2 * i], bytes[2 * i + 1]]),
    }
}

/// Draws `src` onto an RGB565 surface of `dst_w` x `dst_h`, clipping
/// whatever falls outside. JPEG sources are decoded first; non-positive
/// scales draw nothing.
pub fn draw_scaled(src: &Image, dst: &mut [u16], dst_w: u32, dst_h: u32, opts: &DrawOptions) -> Result<()> {
    let decoded;
    let src = if src.is_compressed() {
        decoded = src.decompress()?;
        &decoded
    } else {
        src
    };

    let out_w = (src.width() as f32 * opts.x_scale).round() as i64;
    let out_h = (src.height() as f32 * opts.y_scale).round() as i64;
    if out_w <= 0 || out_h <= 0 {
        return Ok(());
    }

    // only the rows and columns that land on the surface
    let (x, y) = (opts.x as i64, opts.y as i64);
    let rows = (-y).max(0)..out_h.min(dst_h as i64 - y);
    let cols = (-x).max(0)..out_w.min(dst_w as i64 - x);
    for dy in rows {
        let row = (y + dy) as usize * dst_w as usize;
        let sy = (dy * src.height() as i64 / out_h) as u32;
        for dx in cols.clone() {
            let sx = (dx * src.width() as i64 / out_w) as u32;
            dst[row + (x + dx) as usize] = sample_rgb565(src, sx, sy);
        }
    }
    Ok(())
}

/// Resamples a raw image to `width` x `height`, keeping its format.
pub fn resize_nearest(src: &Image, width: u32, height: u32) -> Result<Image> {
    let raw = src.decompress()?;
    if raw.width() == width && raw.height() == height {
        return Ok(raw);
    }
    let bpp = raw.format().bytes_per_pixel().ok_or(EngineError::Compressed)?;
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(width as usize * height as usize * bpp);
    for y in 0..height as u64 {
        let sy = (y * raw.height() as u64 / height.max(1) as u64) as usize;
        for x in 0..width as u64 {
            let sx = (x * raw.width() as u64 / width.max(1) as u64) as usize;
            let i = (sy * raw.width() as usize + sx) * bpp;
            out.extend_from_slice(&bytes[i..i + bpp]);
        }
    }
    Image::from_raw(width, height, raw.format(), out)
}
