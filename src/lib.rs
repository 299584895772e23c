//! Library crate for netprobe-rs: a concurrent port scanner and a TCP connect ping.
pub mod config;
pub mod error;
pub mod logging;
pub mod ping;
pub mod ports;
pub mod report;
pub mod resolve;
pub mod scanner;
pub mod types;

pub use error::{Error, Result};
