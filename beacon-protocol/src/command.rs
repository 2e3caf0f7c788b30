//! Command strings
//!
//! A command is a lowercased, whitespace-separated line such as
//! `rgb 3 130 40 242`. The first token is the verb; up to [`MAX_ARGS`]
//! following tokens are positional arguments. Matching is ASCII
//! case-insensitive.

use heapless::String;

use crate::frame::{Frame, FrameError, MAX_BODY_LEN};

/// Maximum number of positional arguments considered after the verb
pub const MAX_ARGS: usize = 4;

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    text: String<MAX_BODY_LEN>,
}

impl Command {
    /// Parse command text, lowercasing it
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let mut lowered = String::new();
        for c in text.chars() {
            lowered
                .push(c.to_ascii_lowercase())
                .map_err(|_| FrameError::InvalidLength)?;
        }
        Ok(Self { text: lowered })
    }

    /// Decode a command from a received frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        Self::parse(frame.body_str()?)
    }

    /// Encode this command into a frame
    ///
    /// Fails with [`FrameError::InvalidLength`] for an empty command.
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        Frame::new(self.text.as_bytes())
    }

    /// The lowercased command text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True when the command has no tokens at all
    pub fn is_blank(&self) -> bool {
        self.text.split_whitespace().next().is_none()
    }

    /// First token, or `""` for a blank command
    pub fn verb(&self) -> &str {
        self.text.split_whitespace().next().unwrap_or("")
    }

    /// Positional argument `index` (0-based, after the verb)
    pub fn arg(&self, index: usize) -> Option<&str> {
        if index >= MAX_ARGS {
            return None;
        }
        self.text.split_whitespace().nth(index + 1)
    }

    /// Number of tokens including the verb
    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Parse argument `index` as a number
    pub fn arg_parsed<T: core::str::FromStr>(&self, index: usize) -> Option<T> {
        self.arg(index).and_then(|s| s.parse().ok())
    }
}
