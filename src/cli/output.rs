//! Transcript output
//!
//! Commands and replies go to stdout in send order. Logging goes to
//! stderr so the transcript stays clean for scripts.

use crate::core::radio::{AtCommand, Exchange};
use clap::ValueEnum;
use std::io::{self, Write};

/// How replies are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Reply text with the line terminator removed
    #[default]
    Text,
    /// Reply text with control bytes shown as escapes
    Escaped,
    /// Reply bytes in hex
    Hex,
    /// One JSON object per exchange
    Json,
}

/// Format a reply for display
pub fn format_response(data: &[u8], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text | OutputFormat::Json => trimmed_text(data),
        OutputFormat::Escaped => escaped_format(data),
        OutputFormat::Hex => hex_format(data),
    }
}

fn trimmed_text(data: &[u8]) -> String {
    let end = data
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |i| i + 1);
    String::from_utf8_lossy(&data[..end]).into_owned()
}

fn hex_format(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" ")
}

fn escaped_format(data: &[u8]) -> String {
    data.iter()
        .map(|&b| match b {
            0x00 => "\\0".to_string(),
            0x09 => "\\t".to_string(),
            0x0a => "\\n".to_string(),
            0x0d => "\\r".to_string(),
            0x20..=0x7e => (b as char).to_string(),
            _ => format!("\\x{:02x}", b),
        })
        .collect()
}

fn json_format(exchange: &Exchange) -> String {
    serde_json::json!({
        "command": exchange.command.as_str(),
        "response": trimmed_text(&exchange.response),
        "bytes": exchange.response.len(),
        "timed_out": exchange.timed_out(),
    })
    .to_string()
}

/// Writes the command/reply transcript
pub struct ExchangePrinter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl ExchangePrinter<io::Stdout> {
    /// Print to stdout
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> ExchangePrinter<W> {
    /// Print to any writer
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Called after a command is written, before its reply is read
    pub fn command(&mut self, command: &AtCommand) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return Ok(());
        }
        writeln!(self.out, "{}", command)?;
        self.out.flush()
    }

    /// Called once the reply (possibly empty) is in
    pub fn response(&mut self, exchange: &Exchange) -> io::Result<()> {
        let line = match self.format {
            OutputFormat::Json => json_format(exchange),
            format => format_response(&exchange.response, format),
        };
        writeln!(self.out, "{}", line)?;
        self.out.flush()
    }

    /// Write a free-form line
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}
