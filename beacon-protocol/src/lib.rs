//! Beacon shared-buffer command protocol
//!
//! This crate defines the envelope exchanged between a host controller and a
//! Beacon peripheral over I2C. The peripheral exposes one 64-byte register
//! buffer at offset 0; the host writes a command frame into it, waits for the
//! peripheral to overwrite it with a response frame, then reads it back.
//!
//! # Protocol Overview
//!
//! Both directions use the same frame:
//! ```text
//! ┌────────┬────────┬─────────────┐
//! │ LENGTH │ HEADER │ BODY        │
//! │ 1B     │ 1B     │ 1–61B       │
//! └────────┴────────┴─────────────┘
//! ```
//!
//! The header byte is reserved and carried opaquely. Bodies are ASCII
//! command strings going out and a small fixed vocabulary of responses
//! (`ACK`, `NACK`, `ERR`, `PING`) or a data string coming back.

// Use no_std only when NOT testing (property tests need std)
#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod frame;
pub mod response;

pub use command::{Command, MAX_ARGS};
pub use frame::{
    Frame, FrameError, BUFFER_CAPACITY, DEFAULT_HEADER, FRAME_OVERHEAD, MAX_BODY_LEN,
    MAX_COMMAND_LEN,
};
pub use response::Response;
