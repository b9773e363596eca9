//! Serial port transport implementation

use super::{LineReader, TransportError, TransportStats, TransportTrait};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::fmt;
use std::io::{Read, Write};
use std::time::Duration;

/// UART the module is wired to on a Raspberry Pi
pub const DEFAULT_PORT: &str = "/dev/ttyS0";

/// Serial port parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SerialParity {
    /// No parity
    #[default]
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
}

/// Serial port configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port name (e.g., /dev/ttyS0, /dev/ttyAMA0)
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits (5, 6, 7, 8)
    pub data_bits: u8,
    /// Stop bits (1, 2)
    pub stop_bits: u8,
    /// Parity
    pub parity: SerialParity,
    /// Time allowed for one reply line
    #[serde(with = "millis")]
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// 8N1 at the given rate with a one second reply timeout
    pub fn new(port: &str, baud_rate: u32) -> Self {
        Self {
            port: port.to_string(),
            baud_rate,
            data_bits: 8,
            stop_bits: 1,
            parity: SerialParity::None,
            read_timeout: Duration::from_secs(1),
        }
    }

    /// Set data bits
    #[must_use]
    pub fn data_bits(mut self, bits: u8) -> Self {
        self.data_bits = bits;
        self
    }

    /// Set stop bits
    #[must_use]
    pub fn stop_bits(mut self, bits: u8) -> Self {
        self.stop_bits = bits;
        self
    }

    /// Set parity
    #[must_use]
    pub fn parity(mut self, parity: SerialParity) -> Self {
        self.parity = parity;
        self
    }

    /// Set the reply timeout
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, 9600)
    }
}

impl fmt::Display for SerialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parity = match self.parity {
            SerialParity::None => "N",
            SerialParity::Odd => "O",
            SerialParity::Even => "E",
        };
        write!(
            f,
            "{} @ {} baud ({}{}{})",
            self.port, self.baud_rate, self.data_bits, parity, self.stop_bits
        )
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Serial port transport
///
/// The port is closed when the transport is dropped.
pub struct SerialTransport {
    config: SerialConfig,
    port: Box<dyn SerialPort>,
    lines: LineReader,
    stats: TransportStats,
}

impl SerialTransport {
    /// Open and configure the port
    pub fn open(config: SerialConfig) -> Result<Self, TransportError> {
        let data_bits = match config.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            _ => DataBits::Eight,
        };

        let stop_bits = match config.stop_bits {
            2 => StopBits::Two,
            _ => StopBits::One,
        };

        let parity = match config.parity {
            SerialParity::Odd => Parity::Odd,
            SerialParity::Even => Parity::Even,
            SerialParity::None => Parity::None,
        };

        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open()
            .map_err(|e| open_error(&config.port, &e))?;

        // Drop anything the module said before we were listening.
        if let Err(e) = port.clear(ClearBuffer::Input) {
            tracing::debug!("Could not flush input on {}: {}", config.port, e);
        }

        tracing::info!("Opened {}", config);

        Ok(Self {
            lines: LineReader::new(config.read_timeout),
            config,
            port,
            stats: TransportStats::default(),
        })
    }
}

fn open_error(port: &str, e: &serialport::Error) -> TransportError {
    use std::io::ErrorKind;

    match e.kind() {
        // EBUSY from the exclusive lock comes back as NoDevice
        serialport::ErrorKind::NoDevice => TransportError::PortInUse(port.to_string()),
        serialport::ErrorKind::Io(ErrorKind::NotFound) => {
            TransportError::PortNotFound(port.to_string())
        }
        serialport::ErrorKind::Io(ErrorKind::PermissionDenied) => {
            TransportError::PermissionDenied(port.to_string())
        }
        serialport::ErrorKind::Io(ErrorKind::AddrInUse | ErrorKind::WouldBlock) => {
            TransportError::PortInUse(port.to_string())
        }
        _ => TransportError::ConnectionFailed(format!("{port}: {e}")),
    }
}

#[async_trait]
impl TransportTrait for SerialTransport {
    async fn send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.port.write_all(data)?;
        self.port.flush()?;

        tracing::debug!(bytes = data.len(), "TX {:?}", String::from_utf8_lossy(data));

        self.stats.bytes_sent += data.len() as u64;
        self.stats.lines_sent += 1;

        Ok(data.len())
    }

    async fn read_line(&mut self) -> Result<Bytes, TransportError> {
        let port = &mut self.port;
        let line = self.lines.read_line_with(|buf, remaining| {
            port.set_timeout(remaining)?;
            port.read(buf)
        })?;

        if line.is_empty() {
            self.stats.empty_reads += 1;
            tracing::debug!("RX timeout after {:?}", self.lines.timeout());
        } else {
            self.stats.bytes_received += line.len() as u64;
            self.stats.lines_received += 1;
            tracing::debug!(bytes = line.len(), "RX {:?}", String::from_utf8_lossy(&line));
        }

        Ok(line)
    }

    fn connection_info(&self) -> String {
        self.config.to_string()
    }

    fn stats(&self) -> TransportStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_9600_8n1() {
        let config = SerialConfig::default();
        assert_eq!(config.port, "/dev/ttyS0");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits, 8);
        assert_eq!(config.stop_bits, 1);
        assert_eq!(config.parity, SerialParity::None);
        assert_eq!(config.read_timeout, Duration::from_secs(1));
        assert_eq!(config.to_string(), "/dev/ttyS0 @ 9600 baud (8N1)");
    }

    #[test]
    fn test_config_builder() {
        let config = SerialConfig::new("/dev/ttyAMA0", 9600)
            .parity(SerialParity::Even)
            .stop_bits(2)
            .read_timeout(Duration::from_millis(250));
        assert_eq!(config.to_string(), "/dev/ttyAMA0 @ 9600 baud (8E2)");
        assert_eq!(config.read_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_config_serializes_timeout_as_millis() {
        let json = serde_json::to_value(SerialConfig::default()).unwrap();
        assert_eq!(json["read_timeout"], 1000);
        assert_eq!(json["port"], "/dev/ttyS0");
    }

    #[test]
    fn test_open_missing_port() {
        let config = SerialConfig::new("/dev/dra818-does-not-exist", 9600);
        match SerialTransport::open(config) {
            Ok(_) => panic!("opened a port that does not exist"),
            Err(e) => assert!(
                matches!(e, TransportError::PortNotFound(ref p) if p == "/dev/dra818-does-not-exist"),
                "unexpected error: {e}"
            ),
        }
    }

    #[test]
    fn test_open_error_mapping() {
        let missing = serialport::Error::new(
            serialport::ErrorKind::Io(std::io::ErrorKind::NotFound),
            "no such file or directory",
        );
        assert!(matches!(
            open_error("/dev/ttyS0", &missing),
            TransportError::PortNotFound(p) if p == "/dev/ttyS0"
        ));

        let busy = serialport::Error::new(serialport::ErrorKind::NoDevice, "device busy");
        assert!(matches!(
            open_error("/dev/ttyS0", &busy),
            TransportError::PortInUse(p) if p == "/dev/ttyS0"
        ));

        let denied = serialport::Error::new(
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied),
            "permission denied",
        );
        assert!(matches!(
            open_error("/dev/ttyS0", &denied),
            TransportError::PermissionDenied(_)
        ));

        let other = serialport::Error::new(serialport::ErrorKind::InvalidInput, "bad baud");
        assert!(matches!(
            open_error("/dev/ttyS0", &other),
            TransportError::ConnectionFailed(_)
        ));
    }
}
