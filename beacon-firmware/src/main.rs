//! Beacon - I2C command peripheral firmware
//!
//! Runs on a Raspberry Pi Pico. The host writes text commands into a
//! 64-byte register buffer at address 0x47 and reads the response back
//! from the same buffer.
//!
//! Pins: I2C0 SDA GPIO4 / SCL GPIO5, status pixel GPIO16, ring GPIO15.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c_slave::{Config as I2cTargetConfig, I2cSlave};
use embassy_rp::peripherals::{I2C0, PIO0};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::rtc::Rtc;
use embassy_time::Instant;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use {defmt_rtt as _, panic_probe as _};

use beacon_core::{Device, DeviceConfig, Peripherals, RingPeripherals};
use beacon_hal::I2cConfig;

use crate::board::{CortexReset, FrameStrip, PicoBoard, PicoRtc, SignalTimer};
use crate::channels::{RING_FRAME, ROTATE_RATE, STATUS_FRAME, THEME_RATE};

mod board;
mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => embassy_rp::i2c::InterruptHandler<I2C0>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Beacon firmware starting...");

    let p = embassy_rp::init(Default::default());
    let start = Instant::now();

    // I2C target on the shared register buffer
    let bus = I2cConfig::STANDARD;
    let mut target_config = I2cTargetConfig::default();
    target_config.addr = bus.address as u16;
    let target = I2cSlave::new(p.I2C0, p.PIN_5, p.PIN_4, Irqs, target_config);
    info!("I2C target at {:#x}", bus.address);

    // Status pixel and ring on one PIO block
    let Pio {
        mut common,
        sm0,
        sm1,
        ..
    } = Pio::new(p.PIO0, Irqs);
    let program = PioWs2812Program::new(&mut common);
    let status_ws = PioWs2812::new(&mut common, sm0, p.DMA_CH0, p.PIN_16, &program);
    let ring_ws = PioWs2812::new(&mut common, sm1, p.DMA_CH1, p.PIN_15, &program);
    info!("PIO pixels initialized");

    let peripherals = Peripherals::<PicoBoard> {
        status: FrameStrip::new(&STATUS_FRAME),
        ring: Some(RingPeripherals {
            strip: FrameStrip::new(&RING_FRAME),
            rotate_timer: SignalTimer::new(&ROTATE_RATE),
            theme_timer: SignalTimer::new(&THEME_RATE),
        }),
        channels: None,
        audio: None,
        clock: Some(PicoRtc::new(Rtc::new(p.RTC))),
        sensor: None,
        system: CortexReset,
        rng: SmallRng::seed_from_u64(start.as_ticks()),
    };
    let device = Device::new(peripherals, DeviceConfig::default(), 0);

    spawner.spawn(tasks::status_task(status_ws)).unwrap();
    spawner.spawn(tasks::ring_task(ring_ws)).unwrap();
    spawner.spawn(tasks::rotate_timer_task()).unwrap();
    spawner.spawn(tasks::theme_timer_task()).unwrap();
    spawner.spawn(tasks::i2c_target_task(target)).unwrap();
    spawner.spawn(tasks::tick_task(device, start)).unwrap();

    info!("All tasks spawned, firmware running");
}
