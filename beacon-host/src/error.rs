use std::fmt;

use beacon_protocol::FrameError;
use embedded_hal::i2c::ErrorKind;

/// Malformed or not-ready exchange; usually cured by retrying with a longer
/// settle delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Command could not be framed (empty after trimming, or too long)
    InvalidCommand(FrameError),
    /// Response frame did not decode
    BadResponse(FrameError),
    /// Response LENGTH byte outside the valid body range
    SlaveNotReady,
    /// Buffer still held the command just written; the peripheral had not
    /// processed it when it was read
    Stale,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidCommand(e) => write!(f, "cannot frame command: {e:?}"),
            ProtocolError::BadResponse(e) => write!(f, "bad response: {e:?}"),
            ProtocolError::SlaveNotReady => write!(f, "bad message length or slave not ready"),
            ProtocolError::Stale => write!(f, "read back own command; response not ready"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Failure of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Bus-level failure, e.g. no acknowledge; always surfaced
    Bus(ErrorKind),
    Protocol(ProtocolError),
    /// Request made while the transport is disabled
    Disabled,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Bus(kind) => write!(f, "bus error: {kind}"),
            TransportError::Protocol(e) => write!(f, "protocol error: {e}"),
            TransportError::Disabled => write!(f, "transport disabled"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Protocol(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProtocolError> for TransportError {
    fn from(value: ProtocolError) -> Self {
        TransportError::Protocol(value)
    }
}

/// Configuration file or command-line problem
#[derive(Debug)]
pub enum ConfigError {
    InvalidArgs(String),
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidArgs(msg) => write!(f, "invalid arguments: {msg}"),
            ConfigError::Io(err) => write!(f, "io error: {err}"),
            ConfigError::Parse(err) => write!(f, "config parse error: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::NoAcknowledgeSource;

    #[test]
    fn test_display() {
        let e = TransportError::Protocol(ProtocolError::SlaveNotReady);
        assert_eq!(
            e.to_string(),
            "protocol error: bad message length or slave not ready"
        );
        let e = TransportError::Bus(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        assert!(e.to_string().starts_with("bus error"));
    }
}
