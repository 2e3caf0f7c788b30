//! Device-side shared buffer transport
//!
//! The bus exposes one [`BUFFER_CAPACITY`]-byte register buffer. Two contexts
//! touch it:
//!
//! ```text
//!  I2C target (interrupt)              scheduler tick
//!  ──────────────────────              ──────────────
//!  bus_write()  ──▶ buffer
//!  on_end_write() copies buffer
//!      ──▶ staging, new_command = 1
//!                                      poll(): new_command && !processing
//!                                        decode staging ──▶ handler
//!                                        response ──▶ buffer (zero filled)
//!  bus_read()   ◀── buffer
//! ```
//!
//! The interrupt side never decodes or dispatches; it only copies at most
//! one frame and raises a flag. A newer write replaces an unprocessed
//! staged frame.

use core::cell::RefCell;

use beacon_protocol::response::{ACK, ERR};
use beacon_protocol::{
    Command, Frame, Response, BUFFER_CAPACITY, DEFAULT_HEADER, FRAME_OVERHEAD, MAX_COMMAND_LEN,
};
use critical_section::Mutex;
use portable_atomic::{AtomicBool, Ordering};

/// Largest LENGTH byte the end-of-write handler will stage
pub const MAX_STAGED_LEN: u8 = MAX_COMMAND_LEN as u8;

const fn packed(text: &str) -> [u8; BUFFER_CAPACITY] {
    let mut buffer = [0u8; BUFFER_CAPACITY];
    let body = text.as_bytes();
    buffer[0] = body.len() as u8;
    buffer[1] = DEFAULT_HEADER;
    let mut i = 0;
    while i < body.len() {
        buffer[FRAME_OVERHEAD + i] = body[i];
        i += 1;
    }
    buffer
}

/// Zero-filled ERR frame, the fallback when a response does not encode
const ERR_IMAGE: [u8; BUFFER_CAPACITY] = packed(ERR);

/// Encode a response into a zero-filled buffer image
fn encode_response(response: &Response) -> [u8; BUFFER_CAPACITY] {
    let mut image = [0u8; BUFFER_CAPACITY];
    match response.to_frame().and_then(|frame| frame.encode(&mut image)) {
        Ok(_) => image,
        Err(_) => ERR_IMAGE,
    }
}

/// Clears the processing flag on every exit path of [`DeviceTransport::poll`]
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Shared register buffer plus the staging copy and handoff flags
pub struct DeviceTransport {
    buffer: Mutex<RefCell<[u8; BUFFER_CAPACITY]>>,
    staging: Mutex<RefCell<[u8; BUFFER_CAPACITY]>>,
    new_command: AtomicBool,
    processing: AtomicBool,
}

impl Default for DeviceTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceTransport {
    /// Buffer preloaded with a packed ACK so an early read decodes cleanly
    pub const fn new() -> Self {
        Self {
            buffer: Mutex::new(RefCell::new(packed(ACK))),
            staging: Mutex::new(RefCell::new([0; BUFFER_CAPACITY])),
            new_command: AtomicBool::new(false),
            processing: AtomicBool::new(false),
        }
    }

    /// Bus write transaction. `bytes[0]` is the register offset; the rest is
    /// stored from that offset, clipped to the buffer. Returns the number of
    /// data bytes stored (0 for a bare re-address before a read).
    pub fn bus_write(&self, bytes: &[u8]) -> usize {
        let Some((&offset, data)) = bytes.split_first() else {
            return 0;
        };
        let offset = offset as usize;
        if offset >= BUFFER_CAPACITY {
            return 0;
        }
        let count = data.len().min(BUFFER_CAPACITY - offset);
        critical_section::with(|cs| {
            let mut buffer = self.buffer.borrow_ref_mut(cs);
            buffer[offset..offset + count].copy_from_slice(&data[..count]);
        });
        count
    }

    /// Bus read transaction starting at `offset`. Returns bytes copied.
    pub fn bus_read(&self, offset: u8, out: &mut [u8]) -> usize {
        let offset = offset as usize;
        if offset >= BUFFER_CAPACITY {
            return 0;
        }
        let count = out.len().min(BUFFER_CAPACITY - offset);
        critical_section::with(|cs| {
            let buffer = self.buffer.borrow_ref(cs);
            out[..count].copy_from_slice(&buffer[offset..offset + count]);
        });
        count
    }

    /// End-of-write handler, called from interrupt context.
    ///
    /// Stages `LENGTH + 2` bytes when the tentative LENGTH is in
    /// `1..=MAX_STAGED_LEN` and raises `new_command`. Bounded: one copy of at
    /// most [`BUFFER_CAPACITY`] bytes.
    pub fn on_end_write(&self) {
        critical_section::with(|cs| {
            let buffer = self.buffer.borrow_ref(cs);
            let length = buffer[0];
            if !(1..=MAX_STAGED_LEN).contains(&length) {
                return;
            }
            let end = length as usize + FRAME_OVERHEAD;
            self.staging.borrow_ref_mut(cs)[..end].copy_from_slice(&buffer[..end]);
            self.new_command.store(true, Ordering::Release);
        });
    }

    /// Scheduler-tick side: decode the staged frame, run `handler`, write the
    /// response. No-op unless a command is waiting and none is in progress.
    /// Returns `true` if a command was processed.
    ///
    /// Decode failures and handler errors produce an ERR response.
    pub fn poll<E>(&self, handler: impl FnOnce(&Command) -> Result<Response, E>) -> bool {
        if self.processing.load(Ordering::Acquire) {
            return false;
        }
        if !self.new_command.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.processing.store(true, Ordering::Release);
        let _guard = ProcessingGuard(&self.processing);

        let staged = critical_section::with(|cs| *self.staging.borrow_ref(cs));
        let response = match Frame::decode(&staged).and_then(|frame| Command::from_frame(&frame)) {
            Ok(command) => {
                trace!("command '{}'", command.as_str());
                handler(&command).unwrap_or_else(|_| {
                    warn!("command handler failed");
                    Response::Error
                })
            }
            Err(e) => {
                warn!("undecodable command frame: {}", e);
                Response::Error
            }
        };

        let image = encode_response(&response);
        critical_section::with(|cs| {
            *self.buffer.borrow_ref_mut(cs) = image;
        });
        true
    }

    pub fn is_new_command(&self) -> bool {
        self.new_command.load(Ordering::Acquire)
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn buffer_snapshot(&self) -> [u8; BUFFER_CAPACITY] {
        critical_section::with(|cs| *self.buffer.borrow_ref(cs))
    }

    pub fn staging_snapshot(&self) -> [u8; BUFFER_CAPACITY] {
        critical_section::with(|cs| *self.staging.borrow_ref(cs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    fn write_command(transport: &DeviceTransport, text: &str) {
        let mut bytes = std::vec![0u8];
        bytes.extend_from_slice(&Frame::new(text.as_bytes()).unwrap().encode_to_vec().unwrap());
        assert!(transport.bus_write(&bytes) > 0);
        transport.on_end_write();
    }

    fn read_response(transport: &DeviceTransport) -> Response {
        let mut out = [0u8; BUFFER_CAPACITY];
        transport.bus_read(0, &mut out);
        Response::from_frame(&Frame::decode(&out).unwrap()).unwrap()
    }

    fn echo(command: &Command) -> Result<Response, Infallible> {
        Ok(Response::data(command.as_str()).unwrap())
    }

    #[test]
    fn test_initial_buffer_is_ack() {
        let transport = DeviceTransport::new();
        assert_eq!(read_response(&transport), Response::Ack);
        assert!(!transport.is_new_command());
    }

    #[test]
    fn test_poll_without_command_is_noop() {
        let transport = DeviceTransport::new();
        assert!(!transport.poll(echo));
        assert_eq!(read_response(&transport), Response::Ack);
    }

    #[test]
    fn test_command_round_trip() {
        let transport = DeviceTransport::new();
        write_command(&transport, "PING");
        assert!(transport.is_new_command());
        assert!(transport.poll(|cmd: &Command| {
            assert_eq!(cmd.as_str(), "ping");
            Ok::<_, Infallible>(Response::Pong)
        }));
        assert_eq!(read_response(&transport), Response::Pong);
        assert!(!transport.is_new_command());
        assert!(!transport.is_processing());
    }

    #[test]
    fn test_response_zero_fills_residue() {
        let transport = DeviceTransport::new();
        write_command(&transport, "a fairly long command string");
        transport.poll(echo);
        write_command(&transport, "x");
        transport.poll(|_: &Command| Ok::<_, Infallible>(Response::Ack));
        let buffer = transport.buffer_snapshot();
        assert_eq!(&buffer[..5], &[3, 0, b'A', b'C', b'K']);
        assert!(buffer[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_handler_error_gives_err_and_clears_flags() {
        let transport = DeviceTransport::new();
        write_command(&transport, "boom");
        assert!(transport.poll(|_: &Command| Err::<Response, _>("failed")));
        assert_eq!(read_response(&transport), Response::Error);
        assert!(!transport.is_new_command());
        assert!(!transport.is_processing());
    }

    #[test]
    fn test_undecodable_frame_gives_err() {
        let transport = DeviceTransport::new();
        transport.bus_write(&[0, 2, 0, 0xff, 0xfe]);
        transport.on_end_write();
        assert!(transport.poll(echo));
        assert_eq!(read_response(&transport), Response::Error);
    }

    #[test]
    fn test_length_outside_window_not_staged() {
        let transport = DeviceTransport::new();
        let mut bytes = [b'x'; 63];
        bytes[0] = 0;
        bytes[1] = 60;
        transport.bus_write(&bytes);
        transport.on_end_write();
        assert!(!transport.is_new_command());

        transport.bus_write(&[0, 0, 0]);
        transport.on_end_write();
        assert!(!transport.is_new_command());
    }

    #[test]
    fn test_err_image_decodes_as_error() {
        let frame = Frame::decode(&ERR_IMAGE).unwrap();
        assert_eq!(Response::from_frame(&frame).unwrap(), Response::Error);
        assert!(ERR_IMAGE[2 + ERR.len()..].iter().all(|&b| b == 0));
        assert_eq!(encode_response(&Response::Error), ERR_IMAGE);
    }

    #[test]
    fn test_longest_command_is_staged() {
        let transport = DeviceTransport::new();
        let text = "x".repeat(MAX_COMMAND_LEN);
        write_command(&transport, &text);
        assert!(transport.poll(echo));
        assert_eq!(read_response(&transport).body(), text);
    }

    #[test]
    fn test_readdress_write_stores_nothing() {
        let transport = DeviceTransport::new();
        assert_eq!(transport.bus_write(&[0]), 0);
        assert_eq!(transport.bus_write(&[]), 0);
        assert_eq!(read_response(&transport), Response::Ack);
    }

    #[test]
    fn test_latest_command_wins() {
        let transport = DeviceTransport::new();
        write_command(&transport, "first");
        write_command(&transport, "second");
        let mut seen = std::vec::Vec::new();
        transport.poll(|cmd: &Command| {
            seen.push(std::string::String::from(cmd.as_str()));
            Ok::<_, Infallible>(Response::Ack)
        });
        assert_eq!(seen, ["second"]);
        assert!(!transport.poll(echo));
    }

    #[test]
    fn test_write_during_processing_is_kept() {
        let transport = DeviceTransport::new();
        write_command(&transport, "first");
        transport.poll(|_: &Command| {
            assert!(transport.is_processing());
            // nested poll must not start a second command
            write_command(&transport, "second");
            assert!(!transport.poll(echo));
            Ok::<_, Infallible>(Response::Ack)
        });
        assert!(!transport.is_processing());
        assert!(transport.is_new_command());
        let staging = transport.staging_snapshot();
        assert_eq!(&staging[2..8], b"second");

        assert!(transport.poll(echo));
        assert_eq!(read_response(&transport), Response::data("second").unwrap());
    }
}
