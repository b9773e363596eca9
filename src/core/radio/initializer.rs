//! Start-up command sequence

use super::{AtCommand, CommandSequence, RadioError};
use crate::cli::ExchangePrinter;
use crate::core::transport::{SerialConfig, SerialTransport, TransportError, TransportTrait};
use bytes::Bytes;
use std::io::Write;

/// One command and whatever came back for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Command as sent, without terminator
    pub command: AtCommand,
    /// Reply bytes, terminator included; empty when the module stayed silent
    pub response: Bytes,
}

impl Exchange {
    /// Nothing arrived before the read timeout
    pub fn timed_out(&self) -> bool {
        self.response.is_empty()
    }
}

/// Result of a full initialization run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Exchanges in send order
    pub exchanges: Vec<Exchange>,
}

impl InitReport {
    /// Commands that got no reply
    pub fn timeouts(&self) -> usize {
        self.exchanges.iter().filter(|e| e.timed_out()).count()
    }
}

/// Sends a command sequence to the module, one reply line per command.
///
/// Replies are reported, never checked, and a silent module does not stop
/// the sequence.
pub struct RadioInitializer<T: TransportTrait> {
    link: T,
}

impl RadioInitializer<SerialTransport> {
    /// Open the serial port. Nothing is sent if this fails.
    pub fn connect(config: SerialConfig) -> Result<Self, TransportError> {
        SerialTransport::open(config).map(Self::new)
    }
}

impl<T: TransportTrait> RadioInitializer<T> {
    /// Drive an already open link
    pub fn new(link: T) -> Self {
        Self { link }
    }

    /// Get the link
    pub fn link(&self) -> &T {
        &self.link
    }

    /// Give the link back
    pub fn into_inner(self) -> T {
        self.link
    }

    /// Send every command in order: write, print, read one line, print.
    pub async fn run<W: Write>(
        &mut self,
        sequence: &CommandSequence,
        printer: &mut ExchangePrinter<W>,
    ) -> Result<InitReport, RadioError> {
        tracing::info!(
            "Initializing module on {} ({} commands)",
            self.link.connection_info(),
            sequence.len()
        );

        let mut report = InitReport::default();

        for command in sequence {
            self.link.send(&command.to_wire()).await?;
            printer.command(command)?;

            let response = self.link.read_line().await?;
            let exchange = Exchange {
                command: command.clone(),
                response,
            };

            if exchange.timed_out() {
                tracing::warn!("No reply to {}", command);
            }

            printer.response(&exchange)?;
            report.exchanges.push(exchange);
        }

        tracing::info!(
            "Sent {} commands, {} without reply",
            report.exchanges.len(),
            report.timeouts()
        );

        Ok(report)
    }
}
