//! Addressable RGB pixel abstractions

/// A 24-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// All channels off
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// True when every channel is zero
    pub const fn is_black(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    /// Scale each channel by `level` (clamped to 0.0..=1.0), truncating
    pub fn scale(&self, level: f32) -> Self {
        let level = level.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * level) as u8,
            g: (self.g as f32 * level) as u8,
            b: (self.b as f32 * level) as u8,
        }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

/// A strip of addressable pixels
///
/// Writes are buffered; nothing is guaranteed visible until [`show`](Self::show).
pub trait PixelStrip {
    /// Number of pixels on the strip
    fn len(&self) -> usize;

    /// True for a strip with no pixels
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set the colour of one pixel; out-of-range indices are ignored
    fn set_pixel(&mut self, index: usize, color: Rgb);

    /// Latch buffered colours onto the hardware
    fn show(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_truncates() {
        let c = Rgb::new(200, 101, 3);
        assert_eq!(c.scale(0.5), Rgb::new(100, 50, 1));
    }

    #[test]
    fn test_scale_clamps_level() {
        let c = Rgb::new(10, 20, 30);
        assert_eq!(c.scale(2.0), c);
        assert_eq!(c.scale(-1.0), Rgb::BLACK);
    }
}
