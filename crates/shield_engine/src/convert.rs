use std::cmp::{max, min};

pub fn rgb888_to_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

pub fn rgb565_to_rgb888(pixel: u16) -> (u8, u8, u8) {
    let r = ((pixel >> 11) & 0x1f) as u32;
    let g = ((pixel >> 5) & 0x3f) as u32;
    let b = (pixel & 0x1f) as u32;
    (
        ((r * 255 + 15) / 31) as u8,
        ((g * 255 + 31) / 63) as u8,
        ((b * 255 + 15) / 31) as u8,
    )
}

pub fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 38 + g as u32 * 75 + b as u32 * 15) >> 7) as u8
}

pub fn yuyv_to_rgb(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() * 6 / 4);

    for chunk in buf.chunks_exact(4) {
        let y0 = chunk[0] as isize;
        let u = chunk[1] as isize;
        let y1 = chunk[2] as isize;
        let v = chunk[3] as isize;

        let r_comp = (351 * (v - 128)) >> 8;
        let g_comp = (179 * (v - 128) + 86 * (u - 128)) >> 8;
        let b_comp = (443 * (u - 128)) >> 8;

        for y in [y0, y1] {
            out.push(min(255, max(0, y + r_comp)) as u8);
            out.push(min(255, max(0, y - g_comp)) as u8);
            out.push(min(255, max(0, y + b_comp)) as u8);
        }
    }
    out
}

pub fn yuyv_to_rgb565(buf: &[u8]) -> Vec<u8> {
    rgb888_buf_to_rgb565(&yuyv_to_rgb(buf))
}

/// Keeps the Y samples of a YUYV buffer.
pub fn yuyv_to_grayscale(buf: &[u8]) -> Vec<u8> {
    buf.iter().step_by(2).copied().collect()
}

pub fn rgb888_buf_to_rgb565(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() / 3 * 2);
    for px in buf.chunks_exact(3) {
        out.extend_from_slice(&rgb888_to_rgb565(px[0], px[1], px[2]).to_le_bytes());
    }
    out
}

pub fn rgb565_buf_to_rgb888(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() / 2 * 3);
    for px in buf.chunks_exact(2) {
        let (r, g, b) = rgb565_to_rgb888(u16::from_le_bytes([px[0], px[1]]));
        out.extend_from_slice(&[r, g, b]);
    }
    out
}

pub fn rgb565_buf_to_gray(buf: &[u8]) -> Vec<u8> {
    buf.chunks_exact(2)
        .map(|px| {
            let (r, g, b) = rgb565_to_rgb888(u16::from_le_bytes([px[0], px[1]]));
            rgb_to_luma(r, g, b)
        })
        .collect()
}

pub fn gray_buf_to_rgb565(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() * 2);
    for &v in buf {
        out.extend_from_slice(&rgb888_to_rgb565(v, v, v).to_le_bytes());
    }
    out
}
