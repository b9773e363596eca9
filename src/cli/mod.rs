//! CLI Module
//!
//! Provides command-line support:
//! - Exit codes for automation
//! - Transcript output on stdout

pub mod exit_codes;
pub mod output;

pub use exit_codes::{exit_code_description, CliResult, ExitCodes};
pub use output::{format_response, ExchangePrinter, OutputFormat};
