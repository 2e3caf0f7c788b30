//! Ring rotation and theme control
//!
//! Owns the ring strip, its model, and the two periodic timers. Timer ticks
//! arrive as pending flags and are applied by [`RingDriver::on_rotate_due`]
//! and [`RingDriver::on_theme_due`] from the scheduler tick.

use beacon_hal::{PeriodicTimer, PixelStrip, Rgb};
use rand_core::RngCore;

use crate::board::{Board, RingPeripherals};
use crate::config::RingConfig;
use crate::output::ring::{Direction, RingError, RingModel};
use crate::palette::Palette;

/// Ring hardware plus rotation/theme state
pub struct RingDriver<B: Board> {
    model: RingModel,
    strip: B::Ring,
    rotate_timer: B::Timer,
    theme_timer: B::Timer,
    rotating: bool,
    theming: bool,
    rotate_hz: u32,
    theme_hz: u32,
    pulse_steps: u16,
    theme_target: usize,
    palette: Palette,
}

impl<B: Board> RingDriver<B> {
    pub fn new(peripherals: RingPeripherals<B>, config: &RingConfig) -> Self {
        let model = RingModel::new(peripherals.strip.len());
        let mut driver = Self {
            model,
            strip: peripherals.strip,
            rotate_timer: peripherals.rotate_timer,
            theme_timer: peripherals.theme_timer,
            rotating: false,
            theming: false,
            rotate_hz: config.rotate_hz,
            theme_hz: config.theme_hz,
            pulse_steps: config.pulse_steps,
            theme_target: config.theme_target,
            palette: Palette::All,
        };
        driver.render();
        driver
    }

    pub fn model(&self) -> &RingModel {
        &self.model
    }

    pub fn strip(&self) -> &B::Ring {
        &self.strip
    }

    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    pub fn is_theming(&self) -> bool {
        self.theming
    }

    pub fn rotate_hz(&self) -> u32 {
        self.rotate_hz
    }

    pub fn theme_hz(&self) -> u32 {
        self.theme_hz
    }

    pub fn pulse_steps(&self) -> u16 {
        self.pulse_steps
    }

    pub fn theme_target(&self) -> usize {
        self.theme_target
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    fn render(&mut self) {
        self.model.render(&mut self.strip);
    }

    /// Set the colour at a physical position (0-based)
    pub fn set_pixel(&mut self, physical: usize, color: Rgb) -> Result<(), RingError> {
        self.model.set_color(physical, color)?;
        self.render();
        Ok(())
    }

    pub fn fill(&mut self, color: Rgb) {
        self.model.fill(color);
        self.render();
    }

    pub fn clear(&mut self) {
        self.model.clear();
        self.render();
    }

    pub fn set_rotating(&mut self, enabled: bool) {
        self.rotating = enabled;
        if enabled {
            self.rotate_timer.start(self.rotate_hz);
        } else {
            self.rotate_timer.stop();
        }
    }

    pub fn set_rotate_hz(&mut self, hz: u32) -> Result<(), RingError> {
        if hz == 0 {
            return Err(RingError::InvalidRate);
        }
        self.rotate_hz = hz;
        if self.rotating {
            self.rotate_timer.start(hz);
        }
        Ok(())
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.model.set_direction(direction);
    }

    /// Rotate immediately by `shift` positions in the current direction
    pub fn rotate_by(&mut self, shift: i32) -> Result<(), RingError> {
        self.model.rotate(shift)?;
        self.render();
        Ok(())
    }

    /// Start or stop theme pulsation. Starting tops the ring up to the
    /// theme target from the current palette.
    pub fn set_theming<R: RngCore>(&mut self, enabled: bool, rng: &mut R) {
        if enabled {
            self.model.top_up(self.theme_target, self.palette, rng);
            self.render();
            self.theme_timer.start(self.theme_hz);
        } else {
            self.theme_timer.stop();
        }
        self.theming = enabled;
    }

    pub fn set_theme_hz(&mut self, hz: u32) -> Result<(), RingError> {
        if hz == 0 {
            return Err(RingError::InvalidRate);
        }
        self.theme_hz = hz;
        if self.theming {
            self.theme_timer.start(hz);
        }
        Ok(())
    }

    pub fn set_pulse_steps(&mut self, steps: u16) -> Result<(), RingError> {
        if steps == 0 {
            return Err(RingError::InvalidRate);
        }
        self.pulse_steps = steps;
        Ok(())
    }

    /// Clear the ring and activate `count` random pixels from the current palette
    pub fn set_theme_pixels<R: RngCore>(&mut self, count: usize, rng: &mut R) -> Result<(), RingError> {
        if count == 0 || count > self.len() {
            return Err(RingError::CountOutOfRange);
        }
        self.theme_target = count;
        self.model.clear();
        self.model.top_up(count, self.palette, rng);
        self.render();
        Ok(())
    }

    /// Select a palette and repopulate `count` random pixels from it.
    /// Resets the rotation offset.
    pub fn apply_palette<R: RngCore>(
        &mut self,
        palette: Palette,
        count: usize,
        rng: &mut R,
    ) -> Result<(), RingError> {
        self.model.reset_offset();
        self.model.populate(count, palette, rng)?;
        self.palette = palette;
        self.theme_target = count;
        self.render();
        Ok(())
    }

    /// Apply one pending rotation step
    pub fn on_rotate_due(&mut self) {
        if self.model.rotate(1).is_ok() {
            self.render();
        }
    }

    /// Apply one pending theme step
    pub fn on_theme_due(&mut self) {
        self.model.pulse(self.pulse_steps);
        self.render();
    }
}
