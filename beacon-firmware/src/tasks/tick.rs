//! Scheduler tick task
//!
//! Every millisecond: advance the device (output, channels, services,
//! deferred queue, reset), then process a staged command if one arrived.

use core::convert::Infallible;

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use beacon_core::{Device, Lifecycle};

use crate::board::PicoBoard;
use crate::channels::{PENDING, TRANSPORT};

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 1;

#[embassy_executor::task]
pub async fn tick_task(mut device: Device<PicoBoard>, start: Instant) {
    info!("Tick task started");

    let mut lifecycle = Lifecycle::new();
    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));

    while lifecycle.is_enabled() {
        ticker.next().await;
        let now_ms = start.elapsed().as_millis();

        device.tick(now_ms, &PENDING, &mut lifecycle);
        TRANSPORT.poll(|command| Ok::<_, Infallible>(device.process(command, now_ms)));
    }

    warn!("run loop stopped");
}
