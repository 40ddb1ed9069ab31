use serde::{Deserialize, Serialize};

/// 8-bit RGBA colour as consumed by the rendering engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(rgb: [u8; 3], a: u8) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2], a)
    }

    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Linear interpolation of one 8-bit channel, rounded half away from zero.
pub fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    let v = f64::from(from) + t * (f64::from(to) - f64::from(from));
    v.round().clamp(0.0, 255.0) as u8
}
