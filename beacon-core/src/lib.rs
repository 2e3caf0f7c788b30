//! Beacon peripheral core
//!
//! Board-agnostic logic for a command-driven I2C peripheral: the shared
//! buffer transport, the command dispatcher with its deferred queue, and
//! the output arbiter that owns the status pixel and ring.
//!
//! # Contexts
//!
//! ```text
//!  I2C interrupt ──▶ DeviceTransport (staging copy + new_command flag)
//!  timer callbacks ──▶ PendingFlags (rotate_due, theme_due)
//!                              │
//!                              ▼
//!  scheduler tick ──▶ Device::tick ──▶ OutputArbiter, channels, queue
//!                 └─▶ DeviceTransport::poll ──▶ Device::process
//! ```
//!
//! Interrupt and timer contexts only copy bytes and raise flags. All
//! decoding, dispatch and output work happens in the scheduler tick.

// Use no_std only when NOT testing (unit tests use std collections)
#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod board;
pub mod channels;
pub mod color;
pub mod config;
pub mod controller;
pub mod device;
pub mod dispatch;
pub mod output;
pub mod palette;
pub mod queue;
pub mod time;
pub mod transport;
pub mod verbs;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use board::{Board, Peripherals, RingPeripherals};
pub use config::{Capabilities, DeviceConfig};
pub use controller::Controller;
pub use device::{Device, Lifecycle};
pub use dispatch::{Dispatcher, Reply, Verb, VerbError};
pub use output::{Feedback, FeedbackClass, OutputArbiter, Pending, PendingFlags};
pub use queue::DeferredQueue;
pub use transport::DeviceTransport;
