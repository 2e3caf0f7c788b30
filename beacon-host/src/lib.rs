//! Beacon host tooling
//!
//! Talks to a Beacon peripheral from a Linux host over I2C. The transport
//! is generic over `embedded-hal` 1.0 [`I2c`](embedded_hal::i2c::I2c) and
//! [`DelayNs`](embedded_hal::delay::DelayNs), so it runs against
//! `linux-embedded-hal` on a Raspberry Pi or against a simulated bus in
//! tests.

pub mod config;
pub mod error;
pub mod session;
pub mod transport;

pub use config::{CliCommand, CliOptions, RemoteConfig};
pub use error::{ConfigError, ProtocolError, TransportError};
pub use session::{Input, Poller, Session};
pub use transport::{HostTransport, Requester, TransportConfig};
