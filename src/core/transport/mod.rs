//! Transport layer for the radio module link
//!
//! The module speaks newline-terminated ASCII over a UART. Everything above
//! this layer deals in whole lines; everything below deals in bytes.

mod line;
mod serial;

pub use line::LineReader;
pub use serial::{SerialConfig, SerialParity, SerialTransport, DEFAULT_PORT};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Port not found
    #[error("Port not found: {0}")]
    PortNotFound(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Port already in use
    #[error("Port already in use: {0}")]
    PortInUse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TransportError {
    /// True for failures that happen while opening the port.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::PortNotFound(_)
                | Self::PermissionDenied(_)
                | Self::PortInUse(_)
        )
    }
}

/// Transport statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Bytes sent
    pub bytes_sent: u64,
    /// Bytes received
    pub bytes_received: u64,
    /// Lines sent
    pub lines_sent: u64,
    /// Lines received (including partial lines cut off by the timeout)
    pub lines_received: u64,
    /// Reads that ended with nothing received
    pub empty_reads: u64,
}

/// A line-oriented link to the radio module
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransportTrait: Send {
    /// Write raw bytes, returning how many were written
    async fn send(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Read until a line terminator or the read timeout.
    ///
    /// A timeout is not an error: whatever arrived is returned, possibly
    /// nothing at all.
    async fn read_line(&mut self) -> Result<Bytes, TransportError>;

    /// Get connection info string
    fn connection_info(&self) -> String;

    /// Get statistics
    fn stats(&self) -> TransportStats;
}
