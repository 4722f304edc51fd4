use serde::{Deserialize, Serialize};

/// Represents a 24-bit RGB color
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const WHITE: Rgb = Rgb(255, 255, 255);

/// Pack as `0x00RRGGBB`.
pub fn rgb_to_int(color: Rgb) -> u32 {
    let Rgb(r, g, b) = color;
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Inverse of [`rgb_to_int`]. Bits above 23 (alpha on ARGB input) are dropped.
pub fn int_to_rgb(value: u32) -> Rgb {
    Rgb(
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
    )
}

impl Rgb {
    pub fn as_int(self) -> u32 {
        rgb_to_int(self)
    }

    pub fn from_int(value: u32) -> Self {
        int_to_rgb(value)
    }

    pub fn as_tuple(self) -> (u8, u8, u8) {
        (self.0, self.1, self.2)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Rgb(r, g, b)
    }
}

impl From<Rgb> for (u8, u8, u8) {
    fn from(color: Rgb) -> Self {
        color.as_tuple()
    }
}
