//! Radio settings applied at start-up

use super::ConfigError;
use crate::core::radio::{CommandSequence, FilterSetting, Frequency, GroupSetting, Squelch, Volume};
use crate::core::transport::SerialConfig;
use serde::{Deserialize, Serialize};

/// Everything needed to open the link and configure the module
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RadioSettings {
    /// Serial link parameters
    pub serial: SerialConfig,
    /// Channel group
    pub group: GroupSetting,
    /// Audio filters
    pub filter: FilterSetting,
    /// Audio volume
    pub volume: Volume,
}

impl RadioSettings {
    /// Use a different serial device
    #[must_use]
    pub fn port(mut self, port: &str) -> Self {
        self.serial.port = port.to_string();
        self
    }

    /// Tune to `tx`, and to `rx` for receive (or `tx` when absent)
    #[must_use]
    pub fn frequencies(mut self, tx: Frequency, rx: Option<Frequency>) -> Self {
        self.group.tx = tx;
        self.group.rx = rx.unwrap_or(tx);
        self
    }

    /// Set squelch level
    #[must_use]
    pub fn squelch(mut self, squelch: Squelch) -> Self {
        self.group.squelch = squelch;
        self
    }

    /// Set volume
    #[must_use]
    pub fn volume(mut self, volume: Volume) -> Self {
        self.volume = volume;
        self
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.group.validate()
    }

    /// Commands that apply these settings
    pub fn command_sequence(&self) -> CommandSequence {
        CommandSequence::initialize(&self.group, &self.filter, self.volume)
    }
}
