//! Carrier scanning
//!
//! Polls the module's carrier detector on one frequency and reports every
//! poll that did not come back idle.

use super::{AtCommand, Frequency, RadioError};
use crate::cli::ExchangePrinter;
use crate::core::transport::TransportTrait;
use chrono::Local;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Indicator value the module reports when nothing is on the channel
pub const IDLE: i32 = 1;

const TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Scanner settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Frequency to watch
    pub frequency: Frequency,
    /// Pause between polls
    pub period: Duration,
    /// Stop after this many polls
    pub count: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            frequency: Frequency::APRS_2M,
            period: Duration::from_millis(1000),
            count: None,
        }
    }
}

/// Totals for a scan run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Polls sent
    pub polls: u64,
    /// Polls that reported something other than idle
    pub packets: u64,
}

/// Value after the two-byte `S=` prefix, read the way C `atoi` would:
/// leading whitespace and a sign are accepted, anything unparsable is 0.
pub fn signal_indicator(reply: &[u8]) -> i32 {
    let rest = reply.get(2..).unwrap_or_default();
    let rest = match rest.iter().position(|b| !b.is_ascii_whitespace()) {
        Some(start) => &rest[start..],
        None => return 0,
    };

    let (negative, digits) = match rest.first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let value = digits
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i32, |acc, &b| acc.saturating_mul(10).saturating_add(i32::from(b - b'0')));

    if negative {
        -value
    } else {
        value
    }
}

/// Carrier scanner over any link
pub struct Scanner<T: TransportTrait> {
    link: T,
    config: ScanConfig,
}

impl<T: TransportTrait> Scanner<T> {
    /// Create a scanner
    pub fn new(link: T, config: ScanConfig) -> Self {
        Self { link, config }
    }

    /// Poll until `stop` is raised or the poll count is reached
    pub async fn run<W: Write>(
        &mut self,
        printer: &mut ExchangePrinter<W>,
        stop: &AtomicBool,
    ) -> Result<ScanSummary, RadioError> {
        let command = AtCommand::scan(self.config.frequency);
        let wire = command.to_wire();
        let mut summary = ScanSummary::default();

        tracing::info!(
            "Scanning {} MHz every {:?} on {}",
            self.config.frequency,
            self.config.period,
            self.link.connection_info()
        );
        printer.line(&format!(
            "START time: {} ... running",
            Local::now().format(TIME_FORMAT)
        ))?;

        while !stop.load(Ordering::SeqCst) {
            if self.config.count.is_some_and(|n| summary.polls >= n) {
                break;
            }

            self.link.send(&wire).await?;
            let reply = self.link.read_line().await?;
            summary.polls += 1;

            let signal = signal_indicator(&reply);
            tracing::debug!("sig: {} ({:?})", signal, String::from_utf8_lossy(&reply));

            if signal != IDLE {
                summary.packets += 1;
                printer.line(&format!(
                    "packet[{}] at {}",
                    signal,
                    Local::now().format(TIME_FORMAT)
                ))?;
            }

            if !self.config.period.is_zero() {
                tokio::time::sleep(self.config.period).await;
            }
        }

        tracing::info!("Scan stopped after {} polls, {} packets", summary.polls, summary.packets);
        Ok(summary)
    }

    /// Give the link back
    pub fn into_inner(self) -> T {
        self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::core::transport::MockTransportTrait;
    use bytes::Bytes;
    use std::collections::VecDeque;

    #[test]
    fn test_signal_indicator() {
        assert_eq!(signal_indicator(b"S=0\r\n"), 0);
        assert_eq!(signal_indicator(b"S=1\r\n"), 1);
        assert_eq!(signal_indicator(b"S= 12x"), 12);
        assert_eq!(signal_indicator(b"S=-3"), -3);
        assert_eq!(signal_indicator(b""), 0);
        assert_eq!(signal_indicator(b"S="), 0);
        assert_eq!(signal_indicator(b"S=?"), 0);
    }

    #[tokio::test]
    async fn test_reports_non_idle_polls() {
        let mut replies: VecDeque<&'static [u8]> =
            VecDeque::from([&b"S=1\r\n"[..], &b"S=0\r\n"[..], &b""[..]]);

        let mut link = MockTransportTrait::new();
        link.expect_connection_info().return_const("mock".to_string());
        link.expect_send()
            .withf(|data: &[u8]| data == b"S+144.3900\r\n")
            .times(3)
            .returning(|data| Ok(data.len()));
        link.expect_read_line()
            .times(3)
            .returning(move || Ok(Bytes::from_static(replies.pop_front().unwrap_or_default())));

        let config = ScanConfig {
            period: Duration::ZERO,
            count: Some(3),
            ..ScanConfig::default()
        };
        let mut printer = ExchangePrinter::new(Vec::new(), OutputFormat::Text);
        let stop = AtomicBool::new(false);

        let summary = Scanner::new(link, config).run(&mut printer, &stop).await.unwrap();
        assert_eq!(summary, ScanSummary { polls: 3, packets: 2 });

        let out = String::from_utf8(printer.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("START time: "));
        assert!(lines[1].starts_with("packet[0] at "));
        // A silent module reads as 0, same as a carrier
        assert!(lines[2].starts_with("packet[0] at "));
    }

    #[tokio::test]
    async fn test_stop_flag_prevents_polling() {
        let mut link = MockTransportTrait::new();
        link.expect_connection_info().return_const("mock".to_string());
        link.expect_send().never();
        link.expect_read_line().never();

        let mut printer = ExchangePrinter::new(Vec::new(), OutputFormat::Text);
        let stop = AtomicBool::new(true);

        let summary = Scanner::new(link, ScanConfig::default())
            .run(&mut printer, &stop)
            .await
            .unwrap();
        assert_eq!(summary.polls, 0);
    }
}
