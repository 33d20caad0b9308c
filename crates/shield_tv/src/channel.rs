use serde::Deserialize;
use std::fmt;

use crate::error::TvError;

/// Wireless transmitter channel, 1..=8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "u8")]
pub struct Channel(u8);

impl Channel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Channel 8, the wireless video transmitter shield's factory setting.
impl Default for Channel {
    fn default() -> Self {
        Channel(8)
    }
}

impl TryFrom<u8> for Channel {
    type Error = TvError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Channel(value))
        } else {
            Err(TvError::InvalidChannel(value))
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
