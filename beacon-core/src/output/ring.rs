//! Pixel ring model
//!
//! The ring keeps its colour assignment in a model array that never moves.
//! Rotation only changes an offset: physical position `p` shows model
//! element `(p - offset) mod n`. Commands address physical positions, so a
//! colour set at position 1 appears at position 1 regardless of rotation.

use core::f32::consts::PI;

use beacon_hal::{PixelStrip, Rgb};
use heapless::Vec;
use rand_core::RngCore;

use crate::palette::Palette;

/// Largest supported ring
pub const MAX_RING_LEN: usize = 64;

/// Errors from ring operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingError {
    /// Position outside the ring
    IndexOutOfRange,
    /// Rotation larger than the ring
    ShiftOutOfRange,
    /// Pixel count outside `1..=len`
    CountOutOfRange,
    /// Zero frequency or step count
    InvalidRate,
}

/// Per-element output state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelState {
    /// Assigned colour; black means inactive
    pub base: Rgb,
    /// Colour currently shown (base scaled by theme brightness)
    pub color: Rgb,
    /// Theme phase in `0.0..1.0`
    pub phase: f32,
}

impl PixelState {
    pub fn is_active(&self) -> bool {
        !self.base.is_black()
    }

    pub fn assign(&mut self, color: Rgb) {
        self.base = color;
        self.color = color;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    fn sign(&self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

/// Random value in `0.0..1.0`
fn unit_f32<R: RngCore>(rng: &mut R) -> f32 {
    (rng.next_u32() >> 8) as f32 / (1u32 << 24) as f32
}

/// Random index below `n` (`n > 0`)
fn below<R: RngCore>(rng: &mut R, n: usize) -> usize {
    rng.next_u32() as usize % n
}

/// Colour assignment and rotation state for a ring of pixels
#[derive(Debug, Clone)]
pub struct RingModel {
    pixels: Vec<PixelState, MAX_RING_LEN>,
    offset: usize,
    direction: Direction,
}

impl RingModel {
    /// An all-black ring of `len` pixels (capped at [`MAX_RING_LEN`])
    pub fn new(len: usize) -> Self {
        let mut pixels = Vec::new();
        for _ in 0..len.min(MAX_RING_LEN) {
            let _ = pixels.push(PixelState::default());
        }
        Self {
            pixels,
            offset: 0,
            direction: Direction::Forward,
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Model element shown at a physical position
    pub fn logical_index(&self, physical: usize) -> usize {
        let n = self.len();
        (physical % n + n - self.offset) % n
    }

    /// Colour shown at a physical position
    pub fn color_at(&self, physical: usize) -> Rgb {
        if self.is_empty() {
            return Rgb::BLACK;
        }
        self.pixels[self.logical_index(physical)].color
    }

    /// Model element by logical index
    pub fn pixel(&self, logical: usize) -> Option<&PixelState> {
        self.pixels.get(logical)
    }

    pub fn pixels(&self) -> &[PixelState] {
        &self.pixels
    }

    /// Number of elements with a non-black base colour
    pub fn active_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_active()).count()
    }

    /// Assign a colour to the element currently at a physical position
    pub fn set_color(&mut self, physical: usize, color: Rgb) -> Result<(), RingError> {
        if physical >= self.len() {
            return Err(RingError::IndexOutOfRange);
        }
        let logical = self.logical_index(physical);
        self.pixels[logical].assign(color);
        Ok(())
    }

    /// Assign one colour to every element
    pub fn fill(&mut self, color: Rgb) {
        for pixel in self.pixels.iter_mut() {
            pixel.assign(color);
        }
    }

    /// Reset every element to inactive black
    pub fn clear(&mut self) {
        for pixel in self.pixels.iter_mut() {
            pixel.reset();
        }
    }

    pub fn reset_offset(&mut self) {
        self.offset = 0;
    }

    /// Shift the mapping by `shift` positions in the current direction
    pub fn rotate(&mut self, shift: i32) -> Result<(), RingError> {
        let n = self.len() as i32;
        if n == 0 {
            return Ok(());
        }
        if shift.unsigned_abs() > n as u32 {
            return Err(RingError::ShiftOutOfRange);
        }
        let shift = shift * self.direction.sign();
        self.offset = (self.offset as i32 + shift).rem_euclid(n) as usize;
        Ok(())
    }

    /// Clear the ring and activate `count` distinct random elements
    /// with random palette colours and random phases
    pub fn populate<R: RngCore>(
        &mut self,
        count: usize,
        palette: Palette,
        rng: &mut R,
    ) -> Result<(), RingError> {
        if count == 0 || count > self.len() {
            return Err(RingError::CountOutOfRange);
        }
        for pixel in self.pixels.iter_mut() {
            pixel.reset();
            pixel.phase = unit_f32(rng);
        }
        let mut available: Vec<u8, MAX_RING_LEN> = (0..self.len() as u8).collect();
        for _ in 0..count {
            let pick = available.swap_remove(below(rng, available.len()));
            let color = palette.get(below(rng, palette.len()));
            self.pixels[pick as usize].assign(color);
        }
        Ok(())
    }

    /// Activate random inactive elements until `target` are active.
    /// Returns how many were added.
    pub fn top_up<R: RngCore>(&mut self, target: usize, palette: Palette, rng: &mut R) -> usize {
        let needed = target.saturating_sub(self.active_count());
        let mut empty: Vec<u8, MAX_RING_LEN> = (0..self.len() as u8)
            .filter(|&i| !self.pixels[i as usize].is_active())
            .collect();
        let mut added = 0;
        while added < needed && !empty.is_empty() {
            let pick = empty.swap_remove(below(rng, empty.len())) as usize;
            let color = palette.get(below(rng, palette.len()));
            self.pixels[pick].assign(color);
            self.pixels[pick].phase = unit_f32(rng);
            added += 1;
        }
        added
    }

    /// Advance every active element's phase by `1/steps` and recompute
    /// its brightness as `(sin(phase * 2pi) + 1) / 2`
    pub fn pulse(&mut self, steps: u16) {
        let step = 1.0 / steps.max(1) as f32;
        for pixel in self.pixels.iter_mut().filter(|p| p.is_active()) {
            pixel.phase = (pixel.phase + step) % 1.0;
            let brightness = (libm::sinf(pixel.phase * 2.0 * PI) + 1.0) / 2.0;
            pixel.color = pixel.base.scale(brightness);
        }
    }

    /// Write every physical position to a strip and latch it
    pub fn render<S: PixelStrip>(&self, strip: &mut S) {
        for physical in 0..self.len().min(strip.len()) {
            strip.set_pixel(physical, self.color_at(physical));
        }
        strip.show();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn test_set_color_at_physical_position() {
        let mut ring = RingModel::new(24);
        ring.rotate(5).unwrap();
        ring.set_color(0, color::RED).unwrap();
        assert_eq!(ring.color_at(0), color::RED);
        assert_eq!(ring.active_count(), 1);
    }

    #[test]
    fn test_rotation_moves_mapping_not_model() {
        let mut ring = RingModel::new(24);
        ring.set_color(0, color::RED).unwrap();
        let model_before: std::vec::Vec<_> = ring.pixels().to_vec();

        ring.rotate(3).unwrap();
        assert_eq!(ring.color_at(3), color::RED);
        assert_eq!(ring.color_at(0), Rgb::BLACK);
        assert_eq!(ring.pixels(), &model_before[..]);
    }

    #[test]
    fn test_rotate_round_trip() {
        let mut ring = RingModel::new(24);
        ring.set_color(2, color::BLUE).unwrap();
        for s in [-24, -7, 0, 1, 13, 24] {
            let before: std::vec::Vec<_> = (0..24).map(|p| ring.color_at(p)).collect();
            ring.rotate(s).unwrap();
            ring.rotate(-s).unwrap();
            let after: std::vec::Vec<_> = (0..24).map(|p| ring.color_at(p)).collect();
            assert_eq!(before, after, "shift {}", s);
        }
    }

    #[test]
    fn test_reverse_direction_negates_shift() {
        let mut ring = RingModel::new(24);
        ring.set_direction(Direction::Reverse);
        ring.rotate(1).unwrap();
        assert_eq!(ring.offset(), 23);
    }

    #[test]
    fn test_shift_out_of_range() {
        let mut ring = RingModel::new(24);
        assert_eq!(ring.rotate(25), Err(RingError::ShiftOutOfRange));
        assert_eq!(ring.rotate(-25), Err(RingError::ShiftOutOfRange));
        assert_eq!(ring.offset(), 0);
    }

    #[test]
    fn test_index_out_of_range() {
        let mut ring = RingModel::new(24);
        assert_eq!(ring.set_color(24, color::RED), Err(RingError::IndexOutOfRange));
    }

    #[test]
    fn test_populate_exact_count() {
        let mut ring = RingModel::new(24);
        ring.fill(color::WHITE);
        ring.populate(12, Palette::Cool, &mut rng()).unwrap();
        assert_eq!(ring.active_count(), 12);
        for p in ring.pixels().iter().filter(|p| !p.is_active()) {
            assert_eq!(p.color, Rgb::BLACK);
        }
    }

    #[test]
    fn test_populate_rejects_bad_count() {
        let mut ring = RingModel::new(24);
        assert_eq!(
            ring.populate(0, Palette::All, &mut rng()),
            Err(RingError::CountOutOfRange)
        );
        assert_eq!(
            ring.populate(25, Palette::All, &mut rng()),
            Err(RingError::CountOutOfRange)
        );
    }

    #[test]
    fn test_top_up_adds_only_deficit() {
        let mut ring = RingModel::new(24);
        ring.set_color(0, color::RED).unwrap();
        ring.set_color(1, color::RED).unwrap();
        assert_eq!(ring.top_up(5, Palette::Warm, &mut rng()), 3);
        assert_eq!(ring.active_count(), 5);
        assert_eq!(ring.top_up(5, Palette::Warm, &mut rng()), 0);
    }

    #[test]
    fn test_pulse_preserves_active_set() {
        let mut ring = RingModel::new(24);
        ring.populate(12, Palette::All, &mut rng()).unwrap();
        for _ in 0..100 {
            ring.pulse(40);
            assert_eq!(ring.active_count(), 12);
        }
        for p in ring.pixels() {
            if p.is_active() {
                assert!(p.color.r <= p.base.r && p.color.g <= p.base.g && p.color.b <= p.base.b);
            } else {
                assert_eq!(p.color, Rgb::BLACK);
            }
        }
    }

    #[test]
    fn test_pulse_brightness_follows_sine() {
        let mut ring = RingModel::new(1);
        ring.set_color(0, Rgb::new(200, 100, 0)).unwrap();

        ring.pulse(4); // phase 0.25: peak
        assert_eq!(ring.color_at(0), Rgb::new(200, 100, 0));

        ring.pulse(4); // phase 0.5: half
        assert!((99..=100).contains(&ring.color_at(0).r));

        ring.pulse(4); // phase 0.75: trough, still active
        assert_eq!(ring.color_at(0), Rgb::BLACK);
        assert_eq!(ring.active_count(), 1);
    }
}
