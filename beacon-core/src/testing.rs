//! Mock collaborators for host tests
//!
//! Available to this crate's unit tests and, through the `testing` feature,
//! to integration tests in other crates.

use beacon_hal::{
    AudioPlayer, DateTime, DistanceSensor, LedChannels, PeriodicTimer, PixelStrip, RealTimeClock,
    Rgb, SystemControl,
};
use heapless::Vec;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::board::{Board, Peripherals, RingPeripherals};
use crate::config::MAX_CHANNELS;
use crate::output::MAX_RING_LEN;

/// Pixel strip that records staged and latched colours
#[derive(Debug, Clone)]
pub struct MockStrip {
    staged: Vec<Rgb, MAX_RING_LEN>,
    latched: Vec<Rgb, MAX_RING_LEN>,
    shows: u32,
}

impl MockStrip {
    pub fn new(len: usize) -> Self {
        let len = len.min(MAX_RING_LEN);
        let mut staged = Vec::new();
        let _ = staged.resize(len, Rgb::BLACK);
        Self {
            latched: staged.clone(),
            staged,
            shows: 0,
        }
    }

    /// Colour at `index` as of the last `show`
    pub fn last(&self, index: usize) -> Rgb {
        self.latched.get(index).copied().unwrap_or(Rgb::BLACK)
    }

    pub fn shows(&self) -> u32 {
        self.shows
    }
}

impl PixelStrip for MockStrip {
    fn len(&self) -> usize {
        self.staged.len()
    }

    fn set_pixel(&mut self, index: usize, color: Rgb) {
        if let Some(slot) = self.staged.get_mut(index) {
            *slot = color;
        }
    }

    fn show(&mut self) {
        self.latched = self.staged.clone();
        self.shows += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockTimer {
    hz: Option<u32>,
}

impl MockTimer {
    pub fn hz(&self) -> Option<u32> {
        self.hz
    }
}

impl PeriodicTimer for MockTimer {
    fn start(&mut self, hz: u32) {
        self.hz = Some(hz);
    }

    fn stop(&mut self) {
        self.hz = None;
    }

    fn is_running(&self) -> bool {
        self.hz.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct MockChannels {
    levels: Vec<f32, MAX_CHANNELS>,
}

impl MockChannels {
    pub fn new(count: usize) -> Self {
        let mut levels = Vec::new();
        let _ = levels.resize(count.min(MAX_CHANNELS), 0.0);
        Self { levels }
    }

    pub fn level(&self, index: usize) -> f32 {
        self.levels.get(index).copied().unwrap_or(0.0)
    }
}

impl LedChannels for MockChannels {
    fn channel_count(&self) -> usize {
        self.levels.len()
    }

    fn set_brightness(&mut self, index: usize, level: f32) {
        if let Some(slot) = self.levels.get_mut(index) {
            *slot = level;
        }
    }
}

/// Sound names the mock audio player knows
pub const MOCK_SOUNDS: &[&str] = &["chime", "beep", "honk"];

#[derive(Debug, Clone, Default)]
pub struct MockAudio {
    played: Vec<&'static str, 16>,
}

impl MockAudio {
    pub fn played(&self) -> &[&'static str] {
        &self.played
    }
}

impl AudioPlayer for MockAudio {
    type Error = ();

    fn has_sound(&self, name: &str) -> bool {
        MOCK_SOUNDS.contains(&name)
    }

    fn sounds(&self) -> &[&'static str] {
        MOCK_SOUNDS
    }

    fn play(&mut self, name: &str) -> Result<(), ()> {
        let sound = MOCK_SOUNDS.iter().copied().find(|s| *s == name).ok_or(())?;
        self.played.push(sound).map_err(|_| ())
    }

    fn is_playing(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now: DateTime,
}

impl RealTimeClock for MockClock {
    type Error = ();

    fn now(&mut self) -> Result<DateTime, ()> {
        Ok(self.now)
    }

    fn set(&mut self, datetime: DateTime) -> Result<(), ()> {
        self.now = datetime;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MockSensor {
    pub distance_mm: u16,
}

impl DistanceSensor for MockSensor {
    type Error = ();

    fn read_distance(&mut self) -> Result<u16, ()> {
        Ok(self.distance_mm)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockSystem {
    resets: u32,
}

impl MockSystem {
    pub fn resets(&self) -> u32 {
        self.resets
    }
}

impl SystemControl for MockSystem {
    fn reset(&mut self) {
        self.resets += 1;
    }
}

/// Board made entirely of mocks
pub struct MockBoard;

impl Board for MockBoard {
    type Status = MockStrip;
    type Ring = MockStrip;
    type Timer = MockTimer;
    type Channels = MockChannels;
    type Audio = MockAudio;
    type Clock = MockClock;
    type Sensor = MockSensor;
    type System = MockSystem;
    type Rng = SmallRng;
}

pub fn mock_ring(len: usize) -> RingPeripherals<MockBoard> {
    RingPeripherals {
        strip: MockStrip::new(len),
        rotate_timer: MockTimer::default(),
        theme_timer: MockTimer::default(),
    }
}

/// Which mocks to fit
#[derive(Debug, Clone, Copy)]
pub struct MockBoardOptions {
    pub ring_len: usize,
    pub channels: usize,
    pub audio: bool,
    pub clock: bool,
    pub sensor: Option<u16>,
    pub seed: u64,
}

impl MockBoardOptions {
    /// Status pixel only
    pub fn bare() -> Self {
        Self {
            ring_len: 0,
            channels: 0,
            audio: false,
            clock: false,
            sensor: None,
            seed: 1,
        }
    }

    /// 24-pixel ring, six channels, audio, clock and a sensor reading 123 mm
    pub fn full() -> Self {
        Self {
            ring_len: 24,
            channels: MAX_CHANNELS,
            audio: true,
            clock: true,
            sensor: Some(123),
            seed: 1,
        }
    }

    /// 24-pixel ring and clock, as on the Pico board
    pub fn ring() -> Self {
        Self {
            ring_len: 24,
            clock: true,
            ..Self::bare()
        }
    }
}

pub fn board(options: MockBoardOptions) -> Peripherals<MockBoard> {
    Peripherals {
        status: MockStrip::new(1),
        ring: (options.ring_len > 0).then(|| mock_ring(options.ring_len)),
        channels: (options.channels > 0).then(|| MockChannels::new(options.channels)),
        audio: options.audio.then(MockAudio::default),
        clock: options.clock.then(MockClock::default),
        sensor: options.sensor.map(|distance_mm| MockSensor { distance_mm }),
        system: MockSystem::default(),
        rng: SmallRng::seed_from_u64(options.seed),
    }
}
