use image::RgbImage;
use std::{
    fs::{self, File, OpenOptions},
    io::{Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, info};

use crate::channel::Channel;
use crate::error::Result;
use crate::tv::{Canvas, TV_HEIGHT, TV_WIDTH};

/// Where finished canvases go.
pub trait Sink {
    fn select_channel(&mut self, channel: Channel) -> Result<()>;
    fn present(&mut self, canvas: &Canvas) -> Result<()>;
}

pub struct NullSink;

impl Sink for NullSink {
    fn select_channel(&mut self, _channel: Channel) -> Result<()> {
        Ok(())
    }

    fn present(&mut self, _canvas: &Canvas) -> Result<()> {
        Ok(())
    }
}

/// Writes each canvas as little-endian RGB565 at offset 0 of a file or
/// framebuffer device.
pub struct FramebufferSink {
    path: PathBuf,
    file: File,
    channel: Option<Channel>,
}

impl FramebufferSink {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        info!("Framebuffer output on {}", path.display());
        Ok(FramebufferSink {
            path,
            file,
            channel: None,
        })
    }

    pub fn channel(&self) -> Option<Channel> {
        self.channel
    }
}

impl Sink for FramebufferSink {
    fn select_channel(&mut self, channel: Channel) -> Result<()> {
        info!("{}: transmitting on channel {}", self.path.display(), channel);
        self.channel = Some(channel);
        Ok(())
    }

    fn present(&mut self, canvas: &Canvas) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&canvas.to_le_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}

/// Saves every `every`-th canvas as a timestamped PNG.
pub struct SnapshotSink {
    dir: PathBuf,
    every: u32,
    count: u64,
    channel: Option<Channel>,
}

impl SnapshotSink {
    pub fn new<P: AsRef<Path>>(dir: P, every: u32) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(SnapshotSink {
            dir,
            every: every.max(1),
            count: 0,
            channel: None,
        })
    }

    pub fn channel(&self) -> Option<Channel> {
        self.channel
    }
}

impl Sink for SnapshotSink {
    fn select_channel(&mut self, channel: Channel) -> Result<()> {
        debug!("Snapshot sink tagged with channel {}", channel);
        self.channel = Some(channel);
        Ok(())
    }

    fn present(&mut self, canvas: &Canvas) -> Result<()> {
        let index = self.count;
        self.count += 1;
        if index % self.every as u64 != 0 {
            return Ok(());
        }
        let now: chrono::DateTime<chrono::Local> = SystemTime::now().into();
        let dt_str = now.format("%Y%m%d-%H%M%S-%f");
        // the frame index keeps names unique within one clock tick
        let file_path = self.dir.join(format!("{}-{:06}.png", dt_str, index));
        let img = RgbImage::from_raw(TV_WIDTH, TV_HEIGHT, canvas.to_rgb888())
            .ok_or_else(|| std::io::Error::other("canvas size mismatch"))?;
        img.save(&file_path)?;
        debug!("Saved {}", file_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tv::{Tv, TvConfig, TvOutput};
    use shield_engine::{Image, Pixel, PixelFormat};

    fn frame() -> Image {
        let mut img = Image::new(2, 1, PixelFormat::Rgb565).unwrap();
        img.set_pixel(1, 0, Pixel::Rgb(255, 0, 0)).unwrap();
        img
    }

    #[test]
    fn framebuffer_holds_latest_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fb0");
        let mut tv = Tv::new(Box::new(FramebufferSink::open(&path).unwrap()));
        tv.init(&TvConfig::default()).unwrap();
        tv.display(&frame()).unwrap();
        tv.display(&frame()).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), (TV_WIDTH * TV_HEIGHT * 2) as usize);
        assert_eq!(&bytes[0..4], &[0x00, 0x00, 0x00, 0xf8]);
    }

    #[test]
    fn snapshots_every_nth_frame() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("captures");
        let mut sink = SnapshotSink::new(&out, 3).unwrap();

        let canvas = Canvas::blank();
        for _ in 0..4 {
            sink.present(&canvas).unwrap();
        }
        let saved = fs::read_dir(&out).unwrap().count();
        assert_eq!(saved, 2);

        sink.select_channel(Channel::try_from(5).unwrap()).unwrap();
        assert_eq!(sink.channel().map(Channel::get), Some(5));
    }

    #[test]
    fn back_to_back_snapshots_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = SnapshotSink::new(dir.path(), 1).unwrap();
        let canvas = Canvas::blank();
        for _ in 0..5 {
            sink.present(&canvas).unwrap();
        }
        let names = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names.len(), 5);
        for index in 0..5 {
            let suffix = format!("-{:06}.png", index);
            assert!(names.iter().any(|n| n.ends_with(&suffix)));
        }
    }
}
