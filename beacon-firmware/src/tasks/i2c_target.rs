//! I2C target task
//!
//! Stands in for the interrupt side of the transport: it only moves bytes
//! between the bus and [`TRANSPORT`] and raises the end-of-write flag.
//! Decoding happens in the tick task.

use defmt::*;
use embassy_rp::i2c_slave::{Command, I2cSlave, ReadStatus};
use embassy_rp::peripherals::I2C0;

use beacon_protocol::BUFFER_CAPACITY;

use crate::channels::TRANSPORT;

/// Store a controller write; returns the register offset it selected
fn store_write(bytes: &[u8], register: u8) -> u8 {
    let Some(&offset) = bytes.first() else {
        return register;
    };
    if TRANSPORT.bus_write(bytes) > 0 {
        TRANSPORT.on_end_write();
    }
    offset
}

async fn respond(device: &mut I2cSlave<'static, I2C0>, register: u8) {
    let mut out = [0u8; BUFFER_CAPACITY];
    let count = TRANSPORT.bus_read(register, &mut out);
    match device.respond_and_fill(&out[..count], 0x00).await {
        Ok(ReadStatus::Done) => {}
        Ok(status) => trace!("read ended early: {:?}", status),
        Err(e) => warn!("I2C read error: {:?}", e),
    }
}

#[embassy_executor::task]
pub async fn i2c_target_task(mut device: I2cSlave<'static, I2C0>) {
    info!("I2C target task started");

    let mut buf = [0u8; 1 + BUFFER_CAPACITY];
    let mut register = 0u8;

    loop {
        match device.listen(&mut buf).await {
            Ok(Command::Write(len)) => {
                register = store_write(&buf[..len], register);
            }
            Ok(Command::WriteRead(len)) => {
                register = store_write(&buf[..len], register);
                respond(&mut device, register).await;
            }
            Ok(Command::Read) => respond(&mut device, register).await,
            Ok(Command::GeneralCall(len)) => {
                debug!("general call ignored ({} bytes)", len);
            }
            Err(e) => warn!("I2C listen error: {:?}", e),
        }
    }
}
