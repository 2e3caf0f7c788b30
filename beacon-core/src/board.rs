//! Board description
//!
//! A [`Board`] names one concrete type per collaborator. Boards that lack a
//! capability use [`beacon_hal::Absent`] for it and leave the matching slot
//! in [`Peripherals`] empty.

use beacon_hal::{
    AudioPlayer, DistanceSensor, LedChannels, PeriodicTimer, PixelStrip, RealTimeClock,
    SystemControl,
};
use rand_core::RngCore;

use crate::config::{Capabilities, MAX_CHANNELS};

/// Collaborator types for one kind of board
pub trait Board {
    /// Single status pixel used for command feedback and heartbeat
    type Status: PixelStrip;
    /// Addressable ring
    type Ring: PixelStrip;
    /// Periodic timer driving ring rotation or theme pulsation
    type Timer: PeriodicTimer;
    type Channels: LedChannels;
    type Audio: AudioPlayer;
    type Clock: RealTimeClock;
    type Sensor: DistanceSensor;
    type System: SystemControl;
    /// Randomness for theme placement
    type Rng: RngCore;
}

/// Ring strip and its two timers
pub struct RingPeripherals<B: Board> {
    pub strip: B::Ring,
    pub rotate_timer: B::Timer,
    pub theme_timer: B::Timer,
}

/// Collaborator instances for one board
pub struct Peripherals<B: Board> {
    pub status: B::Status,
    pub ring: Option<RingPeripherals<B>>,
    pub channels: Option<B::Channels>,
    pub audio: Option<B::Audio>,
    pub clock: Option<B::Clock>,
    pub sensor: Option<B::Sensor>,
    pub system: B::System,
    pub rng: B::Rng,
}

impl<B: Board> Peripherals<B> {
    /// Derive capabilities from which slots are filled
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            ring_len: self.ring.as_ref().map_or(0, |r| r.strip.len()),
            channel_count: self
                .channels
                .as_ref()
                .map_or(0, |c| c.channel_count().min(MAX_CHANNELS)),
            audio: self.audio.is_some(),
            clock: self.clock.is_some(),
            sensor: self.sensor.is_some(),
        }
    }
}
