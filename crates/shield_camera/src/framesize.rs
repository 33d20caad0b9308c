use serde::Deserialize;
use std::{fmt, str::FromStr};

use crate::sensor::SensorError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum FrameSize {
    Qqcif,
    Qcif,
    Cif,
    Qqsif,
    Qsif,
    Sif,
    Qqqqvga,
    Qqqvga,
    Qqvga,
    Qvga,
    Vga,
    Hqqqvga,
    Hqqvga,
    Hqvga,
}

const FRAME_SIZES: [(FrameSize, &str, u32, u32); 14] = [
    (FrameSize::Qqcif, "QQCIF", 88, 72),
    (FrameSize::Qcif, "QCIF", 176, 144),
    (FrameSize::Cif, "CIF", 352, 288),
    (FrameSize::Qqsif, "QQSIF", 88, 60),
    (FrameSize::Qsif, "QSIF", 176, 120),
    (FrameSize::Sif, "SIF", 352, 240),
    (FrameSize::Qqqqvga, "QQQQVGA", 40, 30),
    (FrameSize::Qqqvga, "QQQVGA", 80, 60),
    (FrameSize::Qqvga, "QQVGA", 160, 120),
    (FrameSize::Qvga, "QVGA", 320, 240),
    (FrameSize::Vga, "VGA", 640, 480),
    (FrameSize::Hqqqvga, "HQQQVGA", 60, 40),
    (FrameSize::Hqqvga, "HQQVGA", 120, 80),
    (FrameSize::Hqvga, "HQVGA", 240, 160),
];

impl FrameSize {
    fn entry(self) -> (FrameSize, &'static str, u32, u32) {
        FRAME_SIZES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn width(self) -> u32 {
        self.entry().2
    }

    pub fn height(self) -> u32 {
        self.entry().3
    }

    pub fn dimensions(self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

impl FromStr for FrameSize {
    type Err = SensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        FRAME_SIZES
            .iter()
            .find(|(_, name, _, _)| *name == upper)
            .map(|(size, _, _, _)| *size)
            .ok_or_else(|| SensorError::Unsupported(format!("unknown frame size '{}'", s)))
    }
}

impl TryFrom<String> for FrameSize {
    type Error = SensorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
