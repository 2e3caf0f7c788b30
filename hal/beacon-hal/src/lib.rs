//! Beacon Hardware Abstraction Layer
//!
//! This crate defines the collaborator traits the peripheral core drives.
//! Board crates (the RP2040 firmware, host-side simulators, test mocks)
//! implement them, and the core never touches hardware directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  beacon-core (dispatch, output arbiter) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  beacon-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ beacon-       │       │  test mocks   │
//! │   firmware    │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`pixel::PixelStrip`] - Addressable RGB pixels (status LED, ring)
//! - [`timer::PeriodicTimer`] - Hardware timers that raise pending flags
//! - [`channels::LedChannels`] - Dimmable single-colour LED outputs
//! - [`audio::AudioPlayer`] - Named sound playback
//! - [`clock::RealTimeClock`] - Settable wall clock
//! - [`sensor::DistanceSensor`] - Range finder
//! - [`system::SystemControl`] - Processor reset
//!
//! [`Absent`] implements every trait for boards that lack a capability.

#![no_std]
#![deny(unsafe_code)]

pub mod absent;
pub mod audio;
pub mod channels;
pub mod clock;
pub mod i2c;
pub mod pixel;
pub mod sensor;
pub mod system;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use absent::Absent;
pub use audio::AudioPlayer;
pub use channels::LedChannels;
pub use clock::{DateTime, RealTimeClock};
pub use i2c::I2cConfig;
pub use pixel::{PixelStrip, Rgb};
pub use sensor::DistanceSensor;
pub use system::SystemControl;
pub use timer::PeriodicTimer;
