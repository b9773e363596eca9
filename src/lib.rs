//! # DRA818 Core Library
//!
//! Brings up a DRA818/SA818-class VHF/UHF transceiver module over its
//! UART and watches its carrier detector:
//! - Serial link at 9600 8N1 with a one second reply timeout
//! - Start-up sequence: handshake, channel group, filters, volume
//! - Carrier scanning on a single frequency
//!
//! ## Example
//!
//! ```rust,no_run
//! use dra818_core::{CommandSequence, ExchangePrinter, OutputFormat, RadioInitializer, SerialConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut radio = RadioInitializer::connect(SerialConfig::default())?;
//!     let mut printer = ExchangePrinter::stdout(OutputFormat::Text);
//!
//!     radio.run(&CommandSequence::default(), &mut printer).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::cli::{CliResult, ExchangePrinter, ExitCodes, OutputFormat};
pub use crate::config::{ConfigError, RadioSettings};
pub use crate::core::radio::{
    AtCommand, CommandSequence, Exchange, Frequency, InitReport, RadioError, RadioInitializer,
    ScanConfig, Scanner, Squelch, Volume,
};
pub use crate::core::transport::{
    SerialConfig, SerialTransport, TransportError, TransportStats, TransportTrait,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
