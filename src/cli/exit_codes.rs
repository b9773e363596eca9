//! CLI Exit Codes
//!
//! Exit codes for scripted start-up (e.g. from a systemd unit).

use crate::config::ConfigError;
use crate::core::radio::RadioError;
use crate::core::transport::TransportError;
use std::process::ExitCode;

/// Exit code constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes;

impl ExitCodes {
    /// Success
    pub const SUCCESS: u8 = 0;

    /// General error
    pub const ERROR: u8 = 1;

    /// Invalid arguments
    pub const INVALID_ARGS: u8 = 2;

    /// Connection failed
    pub const CONNECTION_FAILED: u8 = 3;

    /// Permission denied
    pub const PERMISSION_DENIED: u8 = 7;

    /// Device busy
    pub const DEVICE_BUSY: u8 = 13;

    /// Port not found
    pub const PORT_NOT_FOUND: u8 = 14;
}

/// CLI operation result
#[derive(Debug)]
pub enum CliResult {
    /// Success with optional message
    Success(Option<String>),

    /// Error with code and message
    Error(u8, String),
}

impl CliResult {
    /// Plain success
    pub fn success() -> Self {
        Self::Success(None)
    }

    /// Error with an explicit code
    pub fn error(code: u8, msg: impl Into<String>) -> Self {
        Self::Error(code, msg.into())
    }

    /// Map any error chain to an exit code by its root transport or
    /// config failure
    pub fn from_error(err: &anyhow::Error) -> Self {
        let msg = format!("{err:#}");

        for cause in err.chain() {
            if let Some(e) = cause.downcast_ref::<TransportError>() {
                return Self::Error(transport_code(e), msg);
            }
            if let Some(RadioError::Transport(e)) = cause.downcast_ref::<RadioError>() {
                return Self::Error(transport_code(e), msg);
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return Self::Error(ExitCodes::INVALID_ARGS, msg);
            }
        }

        Self::Error(ExitCodes::ERROR, msg)
    }

    /// Get exit code
    pub fn code(&self) -> u8 {
        match self {
            Self::Success(_) => ExitCodes::SUCCESS,
            Self::Error(code, _) => *code,
        }
    }

    /// Get message
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(Some(msg)) | Self::Error(_, msg) => Some(msg),
            Self::Success(None) => None,
        }
    }

    /// Convert to `ExitCode`
    pub fn to_exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    /// Is success?
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

fn transport_code(err: &TransportError) -> u8 {
    match err {
        TransportError::PortNotFound(_) => ExitCodes::PORT_NOT_FOUND,
        TransportError::PermissionDenied(_) => ExitCodes::PERMISSION_DENIED,
        TransportError::PortInUse(_) => ExitCodes::DEVICE_BUSY,
        TransportError::ConnectionFailed(_) => ExitCodes::CONNECTION_FAILED,
        TransportError::IoError(_) => ExitCodes::ERROR,
    }
}

/// Exit code description
pub fn exit_code_description(code: u8) -> &'static str {
    match code {
        0 => "Success",
        1 => "General error",
        2 => "Invalid arguments",
        3 => "Connection failed",
        7 => "Permission denied",
        13 => "Device busy",
        14 => "Port not found",
        _ => "Unknown error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_cli_result() {
        let success = CliResult::success();
        assert!(success.is_success());
        assert_eq!(success.code(), 0);
        assert_eq!(success.message(), None);

        let error = CliResult::error(3, "Connection failed");
        assert!(!error.is_success());
        assert_eq!(error.code(), 3);
        assert_eq!(error.message(), Some("Connection failed"));
    }

    #[test]
    fn test_from_transport_error() {
        let err = Err::<(), _>(TransportError::PortNotFound("/dev/ttyS0".into()))
            .context("opening radio")
            .unwrap_err();
        let result = CliResult::from_error(&err);
        assert_eq!(result.code(), ExitCodes::PORT_NOT_FOUND);
        assert_eq!(
            result.message(),
            Some("opening radio: Port not found: /dev/ttyS0")
        );
    }

    #[test]
    fn test_from_radio_error() {
        let err = anyhow::Error::new(RadioError::Transport(TransportError::PortInUse(
            "/dev/ttyS0".into(),
        )));
        assert_eq!(CliResult::from_error(&err).code(), ExitCodes::DEVICE_BUSY);
    }

    #[test]
    fn test_from_config_error() {
        let err = anyhow::Error::new(ConfigError::CtcssOutOfRange(40));
        assert_eq!(CliResult::from_error(&err).code(), ExitCodes::INVALID_ARGS);

        let other = anyhow::anyhow!("something else");
        assert_eq!(CliResult::from_error(&other).code(), ExitCodes::ERROR);
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(exit_code_description(ExitCodes::PORT_NOT_FOUND), "Port not found");
        assert_eq!(exit_code_description(99), "Unknown error");
        assert_eq!(exit_code_description(ExitCodes::DEVICE_BUSY), "Device busy");
    }
}
