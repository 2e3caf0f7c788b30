//! Response vocabulary
//!
//! Every processed command produces exactly one response. Four of them are
//! fixed outcome words; anything else is an application data string.

use core::fmt;

use heapless::String;

use crate::frame::{Frame, FrameError, MAX_BODY_LEN};

/// Body of the acknowledge response
pub const ACK: &str = "ACK";
/// Body of the negative-acknowledge response
pub const NACK: &str = "NACK";
/// Body of the error response
pub const ERR: &str = "ERR";
/// Body of the answer to `ping`
pub const PONG: &str = "PING";

/// A response from the peripheral
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Command accepted (or queued)
    Ack,
    /// Command not recognised
    Nack,
    /// Command recognised but failed or had bad arguments
    Error,
    /// Answer to `ping`
    Pong,
    /// Application payload
    Data(String<MAX_BODY_LEN>),
}

impl Response {
    /// Build a data response; the text must be a valid frame body
    pub fn data(text: &str) -> Result<Self, FrameError> {
        if text.is_empty() {
            return Err(FrameError::InvalidLength);
        }
        let mut body = String::new();
        body.push_str(text).map_err(|_| FrameError::InvalidLength)?;
        Ok(Response::Data(body))
    }

    /// The body text carried on the wire
    pub fn body(&self) -> &str {
        match self {
            Response::Ack => ACK,
            Response::Nack => NACK,
            Response::Error => ERR,
            Response::Pong => PONG,
            Response::Data(text) => text.as_str(),
        }
    }

    /// True for `NACK` and `ERR`
    pub fn is_failure(&self) -> bool {
        matches!(self, Response::Nack | Response::Error)
    }

    /// Encode this response into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        Frame::new(self.body().as_bytes())
    }

    /// Parse a response from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.body_str()? {
            ACK => Ok(Response::Ack),
            NACK => Ok(Response::Nack),
            ERR => Ok(Response::Error),
            PONG => Ok(Response::Pong),
            text => Response::data(text),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.body())
    }
}
