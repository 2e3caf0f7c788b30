//! WS2812 flush tasks
//!
//! Pixel strips latch frames into a signal; these tasks push the latest
//! frame out through PIO.

use defmt::*;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::ws2812::PioWs2812;

use crate::channels::{RING_FRAME, RING_LEN, STATUS_FRAME, STATUS_LEN};

#[embassy_executor::task]
pub async fn status_task(mut ws: PioWs2812<'static, PIO0, 0, STATUS_LEN>) {
    info!("Status pixel task started");
    loop {
        let frame = STATUS_FRAME.wait().await;
        ws.write(&frame).await;
    }
}

#[embassy_executor::task]
pub async fn ring_task(mut ws: PioWs2812<'static, PIO0, 1, RING_LEN>) {
    info!("Ring task started");
    loop {
        let frame = RING_FRAME.wait().await;
        ws.write(&frame).await;
    }
}
