//! Host-side request transport
//!
//! One request is a blocking write-then-read against the peripheral's
//! register buffer:
//!
//! 1. write `[0x00] ++ frame` (register 0, then the command frame)
//! 2. wait the settle delay so the peripheral's scheduler tick can replace
//!    the command with its response
//! 3. write `[0x00]`, read the full buffer
//! 4. decode
//! 5. wait the request spacing, whatever the outcome
//!
//! Reading before the settle delay has passed returns the command frame
//! itself, unprocessed. That read is reported as [`ProtocolError::Stale`].
//! Commands longer than [`MAX_COMMAND_LEN`] are refused before sending,
//! since the peripheral would never process them.

use std::borrow::Cow;
use std::time::SystemTime;

use beacon_hal::i2c::{DEFAULT_TARGET_ADDRESS, REGISTER_ADDRESS};
use beacon_protocol::frame::is_valid_length;
use beacon_protocol::{Frame, FrameError, Response, BUFFER_CAPACITY, MAX_COMMAND_LEN};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, info, warn};

use crate::error::{ProtocolError, TransportError};

/// Timing and error policy for [`HostTransport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub address: u8,
    /// Wait between writing a command and reading the response
    pub settle_ms: u32,
    /// Wait after every request
    pub spacing_ms: u32,
    /// Wait in [`HostTransport::enable`] before first use
    pub enable_delay_ms: u32,
    /// Raise protocol errors instead of reporting "no response"
    pub fail_on_protocol_error: bool,
    /// Send `time set now` from [`HostTransport::enable`]
    pub set_time_on_enable: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_TARGET_ADDRESS,
            settle_ms: 11,
            spacing_ms: 50,
            enable_delay_ms: 300,
            fail_on_protocol_error: false,
            set_time_on_enable: true,
        }
    }
}

/// Something that can send a command and return the peripheral's response
pub trait Requester {
    /// `Ok(None)` means nothing was sent, or no usable response came back
    fn request(&mut self, command: &str) -> Result<Option<Response>, TransportError>;
}

/// Decode a raw register read
pub fn decode_response(raw: &[u8]) -> Result<Response, ProtocolError> {
    if let Some(&length) = raw.first() {
        if raw.len() >= 2 && !is_valid_length(length) {
            return Err(ProtocolError::SlaveNotReady);
        }
    }
    Frame::decode(raw)
        .and_then(|frame| Response::from_frame(&frame))
        .map_err(ProtocolError::BadResponse)
}

/// Compact UTC timestamp `YYYYMMDD-HHMMSS`
pub fn compact_timestamp(now: SystemTime) -> String {
    // "YYYY-MM-DDTHH:MM:SSZ"
    let rfc = humantime::format_rfc3339_seconds(now).to_string();
    let rfc = rfc.trim_end_matches('Z');
    match rfc.split_once('T') {
        Some((date, time)) => format!("{}-{}", date.replace('-', ""), time.replace(':', "")),
        None => rfc.to_string(),
    }
}

/// Replace `now` in a `time set` command with the current UTC timestamp
pub fn expand_time(command: &str, now: SystemTime) -> Cow<'_, str> {
    if command.starts_with("time set") && command.contains("now") {
        let stamp = compact_timestamp(now);
        info!("setting time to {stamp}");
        Cow::Owned(command.replace("now", &stamp))
    } else {
        Cow::Borrowed(command)
    }
}

/// Blocking request/response transport over an I2C bus
pub struct HostTransport<I, D> {
    i2c: I,
    delay: D,
    config: TransportConfig,
    enabled: bool,
}

impl<I: I2c, D: DelayNs> HostTransport<I, D> {
    /// Create a disabled transport
    pub fn new(i2c: I, delay: D, config: TransportConfig) -> Self {
        Self {
            i2c,
            delay,
            config,
            enabled: false,
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable after the start-up delay, then optionally set the
    /// peripheral's clock
    pub fn enable(&mut self) -> Result<(), TransportError> {
        if self.enabled {
            warn!("already enabled");
            return Ok(());
        }
        self.enabled = true;
        self.delay.delay_ms(self.config.enable_delay_ms);
        if self.config.set_time_on_enable {
            info!("setting RTC time");
            self.request("time set now")?;
        }
        Ok(())
    }

    pub fn disable(&mut self) {
        if !self.enabled {
            warn!("already disabled");
        }
        self.enabled = false;
    }

    /// Disable and hand back the bus and delay
    pub fn release(mut self) -> (I, D) {
        self.enabled = false;
        (self.i2c, self.delay)
    }

    fn bus_error(e: I::Error) -> TransportError {
        TransportError::Bus(e.kind())
    }

    fn exchange(&mut self, command: &str) -> Result<Response, TransportError> {
        if command.len() > MAX_COMMAND_LEN {
            return Err(ProtocolError::InvalidCommand(FrameError::InvalidLength).into());
        }
        let frame = Frame::new(command.as_bytes()).map_err(ProtocolError::InvalidCommand)?;
        let mut out = [0u8; 1 + BUFFER_CAPACITY];
        out[0] = REGISTER_ADDRESS;
        let len = frame
            .encode(&mut out[1..])
            .map_err(ProtocolError::InvalidCommand)?;
        self.i2c
            .write(self.config.address, &out[..1 + len])
            .map_err(Self::bus_error)?;

        self.delay.delay_ms(self.config.settle_ms);

        let mut raw = [0u8; BUFFER_CAPACITY];
        self.i2c
            .write_read(self.config.address, &[REGISTER_ADDRESS], &mut raw)
            .map_err(Self::bus_error)?;
        if raw[..len] == out[1..1 + len] {
            return Err(ProtocolError::Stale.into());
        }
        Ok(decode_response(&raw)?)
    }
}

impl<I: I2c, D: DelayNs> Requester for HostTransport<I, D> {
    /// Send one command. Bus errors are always returned; protocol errors only
    /// when `fail_on_protocol_error` is set, otherwise they are logged and
    /// reported as `Ok(None)`.
    fn request(&mut self, command: &str) -> Result<Option<Response>, TransportError> {
        if !self.enabled {
            warn!("cannot send request: disabled");
            return Err(TransportError::Disabled);
        }
        if command.is_empty() {
            warn!("did not send empty command");
            return Ok(None);
        }
        let command = expand_time(command, SystemTime::now());
        let result = self.exchange(&command);
        self.delay.delay_ms(self.config.spacing_ms);

        match result {
            Ok(response) => {
                debug!("'{command}' -> {response}");
                Ok(Some(response))
            }
            Err(TransportError::Protocol(e)) if !self.config.fail_on_protocol_error => {
                warn!("'{command}': {e}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
