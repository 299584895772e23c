use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors produced by probes, pings and host resolution.
///
/// Connect failures are data points, not fatal: callers map them to a
/// "closed" outcome. Only the resolution variants abort a run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("connection refused")]
    ConnectRefused,

    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),

    #[error("failed to resolve {host}: {source}")]
    Resolution {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("no address found for {0}")]
    NoAddress(String),
}

impl Error {
    /// Classify a socket error from a connect attempt.
    pub fn from_connect(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => Error::ConnectRefused,
            _ => Error::Connect(err),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Resolution { .. } | Error::NoAddress(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
