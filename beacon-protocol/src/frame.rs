//! Frame encoding and decoding for the shared register buffer.
//!
//! Frame format:
//! - LENGTH (1 byte): body length (1-61)
//! - HEADER (1 byte): reserved, carried opaquely
//! - BODY (LENGTH bytes)
//!
//! There is no checksum; integrity is left to the bus acknowledge and to the
//! caller retrying on malformed frames. A frame always fits the register
//! buffer: `LENGTH + 2 <= 64`.

use heapless::Vec;

/// Size of the peripheral's register buffer
pub const BUFFER_CAPACITY: usize = 64;

/// LENGTH + HEADER
pub const FRAME_OVERHEAD: usize = 2;

/// Maximum body size in bytes
pub const MAX_BODY_LEN: usize = BUFFER_CAPACITY - FRAME_OVERHEAD - 1;

/// Longest command body the peripheral accepts for processing. Longer
/// frames still decode, but the peripheral never stages them.
pub const MAX_COMMAND_LEN: usize = MAX_BODY_LEN - 2;

/// Header byte written by this implementation
pub const DEFAULT_HEADER: u8 = 0x00;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Fewer than two bytes available
    Truncated,
    /// Body length is zero, above the maximum, or exceeds the bytes available
    InvalidLength,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Body is not valid UTF-8 text
    InvalidText,
}

/// Whether a LENGTH byte is within the valid body range
pub const fn is_valid_length(length: u8) -> bool {
    length >= 1 && length as usize <= MAX_BODY_LEN
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Reserved header byte
    pub header: u8,
    /// Body bytes
    pub body: Vec<u8, MAX_BODY_LEN>,
}

impl Frame {
    /// Create a frame around `body` with the default header
    pub fn new(body: &[u8]) -> Result<Self, FrameError> {
        Self::with_header(DEFAULT_HEADER, body)
    }

    /// Create a frame with an explicit header byte
    pub fn with_header(header: u8, body: &[u8]) -> Result<Self, FrameError> {
        if body.is_empty() || body.len() > MAX_BODY_LEN {
            return Err(FrameError::InvalidLength);
        }

        let mut body_vec = Vec::new();
        body_vec
            .extend_from_slice(body)
            .map_err(|_| FrameError::InvalidLength)?;

        Ok(Self {
            header,
            body: body_vec,
        })
    }

    /// Total bytes on the wire
    pub fn wire_len(&self) -> usize {
        FRAME_OVERHEAD + self.body.len()
    }

    /// The body as text
    pub fn body_str(&self) -> Result<&str, FrameError> {
        core::str::from_utf8(&self.body).map_err(|_| FrameError::InvalidText)
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.wire_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = self.body.len() as u8;
        buffer[1] = self.header;
        buffer[FRAME_OVERHEAD..frame_len].copy_from_slice(&self.body);

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, BUFFER_CAPACITY>, FrameError> {
        let mut buffer = [0u8; BUFFER_CAPACITY];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }

    /// Decode a frame from the start of `raw`
    ///
    /// Bytes past the declared length (e.g. zero fill of the register
    /// buffer) are ignored.
    pub fn decode(raw: &[u8]) -> Result<Self, FrameError> {
        if raw.len() < FRAME_OVERHEAD {
            return Err(FrameError::Truncated);
        }

        let length = raw[0];
        if !is_valid_length(length) {
            return Err(FrameError::InvalidLength);
        }

        let end = FRAME_OVERHEAD + length as usize;
        if end > raw.len() {
            return Err(FrameError::InvalidLength);
        }

        Self::with_header(raw[1], &raw[FRAME_OVERHEAD..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_frame_encode_layout() {
        let frame = Frame::new(b"ping").unwrap();
        let mut buffer = [0xFFu8; 10];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 6);
        assert_eq!(buffer[0], 4); // length
        assert_eq!(buffer[1], DEFAULT_HEADER);
        assert_eq!(&buffer[2..6], b"ping");
        assert_eq!(buffer[6], 0xFF); // untouched
    }

    #[test]
    fn test_frame_max_body_fits_buffer() {
        let body = [b'x'; MAX_BODY_LEN];
        let frame = Frame::new(&body).unwrap();
        let encoded = frame.encode_to_vec().unwrap();
        assert_eq!(encoded.len(), 63);
        assert!(encoded.len() <= BUFFER_CAPACITY);
    }

    #[test]
    fn test_empty_body_rejected() {
        assert_eq!(Frame::new(&[]), Err(FrameError::InvalidLength));
    }

    #[test]
    fn test_body_too_large() {
        let body = [0u8; MAX_BODY_LEN + 1];
        assert_eq!(Frame::new(&body), Err(FrameError::InvalidLength));
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(Frame::decode(&[]), Err(FrameError::Truncated));
        assert_eq!(Frame::decode(&[3]), Err(FrameError::Truncated));
    }

    #[test]
    fn test_decode_zero_length() {
        assert_eq!(Frame::decode(&[0, 0, 0, 0]), Err(FrameError::InvalidLength));
    }

    #[test]
    fn test_decode_length_above_max() {
        let mut raw = [0u8; BUFFER_CAPACITY];
        raw[0] = 62;
        assert_eq!(Frame::decode(&raw), Err(FrameError::InvalidLength));
    }

    #[test]
    fn test_decode_length_exceeds_available() {
        assert_eq!(
            Frame::decode(&[5, 0, b'a', b'b']),
            Err(FrameError::InvalidLength)
        );
    }

    #[test]
    fn test_decode_ignores_trailing_fill() {
        let mut raw = [0u8; BUFFER_CAPACITY];
        raw[..5].copy_from_slice(&[3, 0, b'A', b'C', b'K']);
        let frame = Frame::decode(&raw).unwrap();
        assert_eq!(&frame.body[..], b"ACK");
    }

    #[test]
    fn test_header_preserved() {
        let frame = Frame::decode(&[1, 0x5A, b'x']).unwrap();
        assert_eq!(frame.header, 0x5A);
        assert_eq!(frame.encode_to_vec().unwrap()[1], 0x5A);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let frame = Frame::new(b"hello").unwrap();
        let mut buffer = [0u8; 6];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_body_str_rejects_invalid_utf8() {
        let frame = Frame::new(&[0xFF, 0xFE]).unwrap();
        assert_eq!(frame.body_str(), Err(FrameError::InvalidText));
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(body in proptest::collection::vec(any::<u8>(), 1..=MAX_BODY_LEN)) {
            let encoded = Frame::new(&body).unwrap().encode_to_vec().unwrap();
            let decoded = Frame::decode(&encoded).unwrap();
            prop_assert_eq!(&decoded.body[..], &body[..]);
        }

        #[test]
        fn prop_oversized_bodies_rejected(len in (MAX_BODY_LEN + 1)..200usize) {
            let body = [0u8; 200];
            prop_assert_eq!(Frame::new(&body[..len]), Err(FrameError::InvalidLength));
        }

        #[test]
        fn prop_decode_never_panics(raw in proptest::collection::vec(any::<u8>(), 0..=BUFFER_CAPACITY)) {
            let _ = Frame::decode(&raw);
        }
    }
}
