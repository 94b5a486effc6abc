use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cosmetic tint applied to the whole draw path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorState {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for ColorState {
    fn default() -> Self {
        ColorState {
            r: 1.0,
            g: 1.0,
            b: 1.0,
        }
    }
}

impl ColorState {
    /// Replaces every channel with a uniform sample from `[0, 1)`.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        self.r = rng.random();
        self.g = rng.random();
        self.b = rng.random();
    }

    /// Channels as 8-bit values.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }
}
