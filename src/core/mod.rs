//! Core functionality
//!
//! - `transport`: serial link and line framing
//! - `radio`: DRA818 command set, initialization and scanning

pub mod radio;
pub mod transport;
