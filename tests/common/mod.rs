//! Scripted in-memory radio link shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use dra818_core::{TransportError, TransportStats, TransportTrait};
use std::collections::VecDeque;

/// What crossed the link, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Write(Vec<u8>),
    Read(Vec<u8>),
}

/// Stands in for a module: replies come from a script, or a fixed echo
#[derive(Debug, Default)]
pub struct ScriptedLink {
    replies: VecDeque<Bytes>,
    echo: Option<Bytes>,
    pub events: Vec<Event>,
    stats: TransportStats,
}

impl ScriptedLink {
    /// Answers every command with `reply`
    pub fn echoing(reply: &'static [u8]) -> Self {
        Self {
            echo: Some(Bytes::from_static(reply)),
            ..Self::default()
        }
    }

    /// Never answers
    pub fn silent() -> Self {
        Self::default()
    }

    /// Answers from `replies` in order, then falls silent
    pub fn scripted(replies: &[&'static [u8]]) -> Self {
        Self {
            replies: replies.iter().copied().map(Bytes::from_static).collect(),
            ..Self::default()
        }
    }

    /// Everything written, in order
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Write(data) => Some(data.clone()),
                Event::Read(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl TransportTrait for ScriptedLink {
    async fn send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.events.push(Event::Write(data.to_vec()));
        self.stats.bytes_sent += data.len() as u64;
        self.stats.lines_sent += 1;
        Ok(data.len())
    }

    async fn read_line(&mut self) -> Result<Bytes, TransportError> {
        let reply = self
            .replies
            .pop_front()
            .or_else(|| self.echo.clone())
            .unwrap_or_default();

        self.events.push(Event::Read(reply.to_vec()));
        if reply.is_empty() {
            self.stats.empty_reads += 1;
        } else {
            self.stats.bytes_received += reply.len() as u64;
            self.stats.lines_received += 1;
        }
        Ok(reply)
    }

    fn connection_info(&self) -> String {
        "scripted link".to_string()
    }

    fn stats(&self) -> TransportStats {
        self.stats
    }
}
