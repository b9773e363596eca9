//! Configuration module
//!
//! Settings come from the command line only; this module holds the
//! validated form handed to the radio layer.

mod settings;

pub use settings::RadioSettings;

use thiserror::Error;

/// Invalid radio parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Frequency text that is not plain digits
    #[error("Invalid frequency '{0}': use digits only, no decimal point")]
    InvalidFrequency(String),

    /// Frequency outside 134-174 MHz
    #[error("Frequency out of range: {0} (expected 1340000 to 1740000)")]
    FrequencyOutOfRange(u32),

    /// Volume outside 1-8
    #[error("Volume out of range: {0} (expected 1 to 8)")]
    VolumeOutOfRange(u8),

    /// Squelch outside 0-8
    #[error("Squelch out of range: {0} (expected 0 to 8)")]
    SquelchOutOfRange(u8),

    /// CTCSS tone index above 38
    #[error("CTCSS tone out of range: {0} (expected 0 to 38)")]
    CtcssOutOfRange(u8),

    /// Not a number
    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),
}
