//! AT command set of the DRA818/SA818 module
//!
//! Only the commands used to bring a module up and poll its carrier
//! detector are modelled. Replies are never parsed here.

use crate::config::ConfigError;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Appended to every command before it goes on the wire
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// A single AT command, without its terminator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AtCommand(String);

impl AtCommand {
    /// Wrap raw command text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Handshake; the module answers `+DMOCONNECT:0`
    pub fn connect() -> Self {
        Self::new("AT+DMOCONNECT")
    }

    /// Volume setting command
    pub fn set_volume(volume: Volume) -> Self {
        Self(format!("AT+DMOSETVOLUME={volume}"))
    }

    /// Carrier poll on one frequency; the module answers `S=0` (signal) or `S=1`
    pub fn scan(frequency: Frequency) -> Self {
        Self(format!("S+{frequency}"))
    }

    /// Command text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bytes to write: the command followed by CR LF
    pub fn to_wire(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.0.len() + LINE_TERMINATOR.len());
        buf.put_slice(self.0.as_bytes());
        buf.put_slice(LINE_TERMINATOR);
        buf.freeze()
    }
}

impl fmt::Display for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Significant digits the module expects in a frequency
const SIG_DIGITS: usize = 7;

/// Channel frequency in units of 100 Hz (`1443900` is 144.3900 MHz)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frequency(u32);

impl Frequency {
    /// Lowest tunable frequency, 134.0000 MHz
    pub const MIN: u32 = 1_340_000;
    /// Highest tunable frequency, 174.0000 MHz
    pub const MAX: u32 = 1_740_000;
    /// North American 2 m APRS channel
    pub const APRS_2M: Self = Self(1_443_900);

    /// Range-checked frequency in 100 Hz units
    pub fn new(units: u32) -> Result<Self, ConfigError> {
        if (Self::MIN..=Self::MAX).contains(&units) {
            Ok(Self(units))
        } else {
            Err(ConfigError::FrequencyOutOfRange(units))
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::APRS_2M
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}", self.0 / 10_000, self.0 % 10_000)
    }
}

/// Parses the digits-only form used on the command line.
///
/// Input is right-padded with zeros (or cut) to seven digits, so `1443`,
/// `144390` and `1443900` all mean 144.3900 MHz. A decimal point is
/// rejected rather than guessed at.
impl FromStr for Frequency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::InvalidFrequency(s.to_string()));
        }

        let digits: String = s
            .chars()
            .chain(std::iter::repeat('0'))
            .take(SIG_DIGITS)
            .collect();
        let units = digits
            .parse()
            .map_err(|_| ConfigError::InvalidFrequency(s.to_string()))?;

        Self::new(units)
    }
}

/// Channel bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Bandwidth {
    /// 12.5 kHz
    #[default]
    Narrow,
    /// 25 kHz
    Wide,
}

impl Bandwidth {
    fn code(self) -> u8 {
        match self {
            Self::Narrow => 0,
            Self::Wide => 1,
        }
    }
}

macro_rules! bounded_level {
    ($(#[$meta:meta])* $name:ident, $min:expr, $max:expr, $default:expr, $err:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub struct $name(u8);

        impl $name {
            /// Lowest accepted level
            pub const MIN: u8 = $min;
            /// Highest accepted level
            pub const MAX: u8 = $max;

            /// Range-checked level
            pub fn new(level: u8) -> Result<Self, ConfigError> {
                if (Self::MIN..=Self::MAX).contains(&level) {
                    Ok(Self(level))
                } else {
                    Err(ConfigError::$err(level))
                }
            }

            /// Raw level
            pub fn level(self) -> u8 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self($default)
            }
        }

        impl TryFrom<u8> for $name {
            type Error = ConfigError;

            fn try_from(level: u8) -> Result<Self, Self::Error> {
                Self::new(level)
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let level = s
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| ConfigError::InvalidNumber(s.to_string()))?;
                Self::new(level)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

bounded_level!(
    /// Audio output level, 1 through 8
    Volume, 1, 8, 3, VolumeOutOfRange
);

bounded_level!(
    /// Squelch level, 0 (open) through 8
    Squelch, 0, 8, 4, SquelchOutOfRange
);

/// Highest CTCSS tone index the module knows; 0 disables the tone
pub const MAX_CTCSS: u8 = 38;

/// Parameters of `AT+DMOSETGROUP`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupSetting {
    /// Channel bandwidth
    pub bandwidth: Bandwidth,
    /// Transmit frequency
    pub tx: Frequency,
    /// Receive frequency
    pub rx: Frequency,
    /// Transmit CTCSS tone index
    pub tx_ctcss: u8,
    /// Squelch level
    pub squelch: Squelch,
    /// Receive CTCSS tone index
    pub rx_ctcss: u8,
}

impl GroupSetting {
    /// Check the tone indexes; frequencies and squelch are checked on construction
    pub fn validate(&self) -> Result<(), ConfigError> {
        for tone in [self.tx_ctcss, self.rx_ctcss] {
            if tone > MAX_CTCSS {
                return Err(ConfigError::CtcssOutOfRange(tone));
            }
        }
        Ok(())
    }

    /// `AT+DMOSETGROUP=GBW,TFV,RFV,TXCT,SQ,RXCT`
    pub fn to_command(&self) -> AtCommand {
        AtCommand(format!(
            "AT+DMOSETGROUP={},{},{},{:04},{},{:04}",
            self.bandwidth.code(),
            self.tx,
            self.rx,
            self.tx_ctcss,
            self.squelch,
            self.rx_ctcss,
        ))
    }
}

/// Parameters of `AT+SETFILTER`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSetting {
    /// Pre/de-emphasis
    pub emphasis: bool,
    /// High-pass filter
    pub high_pass: bool,
    /// Low-pass filter
    pub low_pass: bool,
}

impl Default for FilterSetting {
    fn default() -> Self {
        Self {
            emphasis: true,
            high_pass: true,
            low_pass: true,
        }
    }
}

impl FilterSetting {
    /// `AT+SETFILTER=E,H,L`
    pub fn to_command(&self) -> AtCommand {
        AtCommand(format!(
            "AT+SETFILTER={},{},{}",
            u8::from(self.emphasis),
            u8::from(self.high_pass),
            u8::from(self.low_pass),
        ))
    }
}

/// Ordered commands sent to bring the module up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSequence(Vec<AtCommand>);

impl CommandSequence {
    /// Handshake, channel, filter, volume
    pub fn initialize(group: &GroupSetting, filter: &FilterSetting, volume: Volume) -> Self {
        Self(vec![
            AtCommand::connect(),
            group.to_command(),
            filter.to_command(),
            AtCommand::set_volume(volume),
        ])
    }

    /// Commands in send order
    pub fn iter(&self) -> std::slice::Iter<'_, AtCommand> {
        self.0.iter()
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there is nothing to send
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CommandSequence {
    fn default() -> Self {
        Self::initialize(
            &GroupSetting::default(),
            &FilterSetting::default(),
            Volume::default(),
        )
    }
}

impl<'a> IntoIterator for &'a CommandSequence {
    type Item = &'a AtCommand;
    type IntoIter = std::slice::Iter<'a, AtCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
