//! Line framing over a byte stream with a read deadline

use bytes::{Bytes, BytesMut};
use std::io::{self, ErrorKind, Read};
use std::time::{Duration, Instant};

const CHUNK_SIZE: usize = 128;

/// Accumulates bytes into `\n`-terminated lines.
///
/// Bytes that arrive after a terminator stay buffered for the next call,
/// so a module that answers two lines in one burst is still read one
/// line at a time.
#[derive(Debug)]
pub struct LineReader {
    pending: BytesMut,
    timeout: Duration,
}

impl LineReader {
    /// Create a reader whose lines give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: BytesMut::with_capacity(CHUNK_SIZE),
            timeout,
        }
    }

    /// Read timeout for one line
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Bytes received but not yet returned
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Read one line from any blocking reader
    pub fn read_line<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<Bytes> {
        self.read_line_with(|buf, _remaining| reader.read(buf))
    }

    /// Read one line, handing the time left before the deadline to `read`
    /// so the caller can bound each blocking read.
    ///
    /// Returns the line including its terminator, or whatever was collected
    /// when the deadline passed or the reader ran dry.
    pub fn read_line_with<F>(&mut self, mut read: F) -> io::Result<Bytes>
    where
        F: FnMut(&mut [u8], Duration) -> io::Result<usize>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut chunk = [0u8; CHUNK_SIZE];

        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                return Ok(self.pending.split_to(pos + 1).freeze());
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(self.pending.split().freeze());
            }

            match read(&mut chunk[..], remaining) {
                Ok(0) => return Ok(self.pending.split().freeze()),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(self.pending.split().freeze());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Hands out one scripted chunk per read, then times out
    struct Chunked(VecDeque<Vec<u8>>);

    impl Read for Chunked {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => Err(io::Error::new(ErrorKind::TimedOut, "timed out")),
            }
        }
    }

    fn chunked(parts: &[&[u8]]) -> Chunked {
        Chunked(parts.iter().map(|p| p.to_vec()).collect())
    }

    #[test]
    fn test_line_split_across_reads() {
        let mut reader = chunked(&[b"+DMOCON", b"NECT:0\r", b"\n"]);
        let mut lines = LineReader::new(Duration::from_secs(1));

        let line = lines.read_line(&mut reader).unwrap();
        assert_eq!(&line[..], b"+DMOCONNECT:0\r\n");
    }

    #[test]
    fn test_keeps_bytes_after_terminator() {
        let mut reader = chunked(&[b"S=0\r\nS=1\r\n"]);
        let mut lines = LineReader::new(Duration::from_secs(1));

        assert_eq!(&lines.read_line(&mut reader).unwrap()[..], b"S=0\r\n");
        assert_eq!(lines.buffered(), 5);
        assert_eq!(&lines.read_line(&mut reader).unwrap()[..], b"S=1\r\n");
        assert_eq!(lines.buffered(), 0);
    }

    #[test]
    fn test_timeout_returns_partial() {
        let mut reader = chunked(&[b"+DMOSET"]);
        let mut lines = LineReader::new(Duration::from_secs(1));

        let line = lines.read_line(&mut reader).unwrap();
        assert_eq!(&line[..], b"+DMOSET");
    }

    #[test]
    fn test_silent_device_returns_empty() {
        let mut reader = chunked(&[]);
        let mut lines = LineReader::new(Duration::from_secs(1));

        assert!(lines.read_line(&mut reader).unwrap().is_empty());
    }

    #[test]
    fn test_deadline_already_passed() {
        let mut lines = LineReader::new(Duration::ZERO);
        let mut calls = 0;

        let line = lines
            .read_line_with(|_, _| {
                calls += 1;
                Ok(0)
            })
            .unwrap();
        assert!(line.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_hard_error_propagates() {
        let mut lines = LineReader::new(Duration::from_secs(1));
        let err = lines
            .read_line_with(|_, _| Err(io::Error::new(ErrorKind::BrokenPipe, "unplugged")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
    }
}
