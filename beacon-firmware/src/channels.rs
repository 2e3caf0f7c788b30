//! Statics shared between tasks and interrupt-side code

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use smart_leds::RGB8;

use beacon_core::{DeviceTransport, PendingFlags};

/// Pixels on the status LED
pub const STATUS_LEN: usize = 1;

/// Pixels on the NeoPixel ring
pub const RING_LEN: usize = 24;

/// Shared register buffer, written by the I2C task and polled by the tick task
pub static TRANSPORT: DeviceTransport = DeviceTransport::new();

/// Rotate/theme flags raised by the timer tasks
pub static PENDING: PendingFlags = PendingFlags::new();

/// Latched status pixel frame waiting to be flushed
pub static STATUS_FRAME: Signal<CriticalSectionRawMutex, [RGB8; STATUS_LEN]> = Signal::new();

/// Latched ring frame waiting to be flushed
pub static RING_FRAME: Signal<CriticalSectionRawMutex, [RGB8; RING_LEN]> = Signal::new();

/// Rotation timer rate (`None` stops it)
pub static ROTATE_RATE: Signal<CriticalSectionRawMutex, Option<u32>> = Signal::new();

/// Theme timer rate (`None` stops it)
pub static THEME_RATE: Signal<CriticalSectionRawMutex, Option<u32>> = Signal::new();
