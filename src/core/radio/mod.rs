//! DRA818/SA818 module control
//!
//! - AT command construction
//! - Start-up command sequence
//! - Carrier scanning

mod command;
mod initializer;
mod scan;

pub use command::{
    AtCommand, Bandwidth, CommandSequence, FilterSetting, Frequency, GroupSetting, Squelch,
    Volume, LINE_TERMINATOR, MAX_CTCSS,
};
pub use initializer::{Exchange, InitReport, RadioInitializer};
pub use scan::{signal_indicator, ScanConfig, ScanSummary, Scanner};

use crate::core::transport::TransportError;
use thiserror::Error;

/// Failure while talking to the module
#[derive(Error, Debug)]
pub enum RadioError {
    /// Link failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Could not write the transcript
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}
