//! Placeholder for capabilities a board does not have
//!
//! Board descriptions name one concrete type per capability. Boards without,
//! say, audio use [`Absent`] and leave the peripheral slot empty; the core
//! never calls into it because the matching verbs are not registered.

use crate::audio::AudioPlayer;
use crate::channels::LedChannels;
use crate::clock::{DateTime, RealTimeClock};
use crate::pixel::{PixelStrip, Rgb};
use crate::sensor::DistanceSensor;
use crate::system::SystemControl;
use crate::timer::PeriodicTimer;

/// A capability that is not fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Absent;

impl PixelStrip for Absent {
    fn len(&self) -> usize {
        0
    }

    fn set_pixel(&mut self, _index: usize, _color: Rgb) {}

    fn show(&mut self) {}
}

impl PeriodicTimer for Absent {
    fn start(&mut self, _hz: u32) {}

    fn stop(&mut self) {}

    fn is_running(&self) -> bool {
        false
    }
}

impl LedChannels for Absent {
    fn channel_count(&self) -> usize {
        0
    }

    fn set_brightness(&mut self, _index: usize, _level: f32) {}
}

impl AudioPlayer for Absent {
    type Error = Absent;

    fn has_sound(&self, _name: &str) -> bool {
        false
    }

    fn sounds(&self) -> &[&'static str] {
        &[]
    }

    fn play(&mut self, _name: &str) -> Result<(), Absent> {
        Err(Absent)
    }

    fn is_playing(&self) -> bool {
        false
    }
}

impl RealTimeClock for Absent {
    type Error = Absent;

    fn now(&mut self) -> Result<DateTime, Absent> {
        Err(Absent)
    }

    fn set(&mut self, _datetime: DateTime) -> Result<(), Absent> {
        Err(Absent)
    }
}

impl DistanceSensor for Absent {
    type Error = Absent;

    fn read_distance(&mut self) -> Result<u16, Absent> {
        Err(Absent)
    }
}

impl SystemControl for Absent {
    fn reset(&mut self) {}
}
