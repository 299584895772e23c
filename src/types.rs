use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::Error;

/// Transport used by the port scanner.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("tcp"),
            Protocol::Udp => f.write_str("udp"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Open,
    Closed,
}

impl Outcome {
    /// Label used in per-probe and per-attempt output lines.
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Open => "open",
            Outcome::Closed => "close",
        }
    }

    pub fn from_connected(connected: bool) -> Self {
        if connected {
            Outcome::Open
        } else {
            Outcome::Closed
        }
    }
}

/// Result of a single probe. Produced by a worker, consumed by the collector.
#[derive(Debug)]
pub struct ProbeResult {
    pub port: u16,
    pub outcome: Outcome,
    pub error: Option<Error>,
}

impl ProbeResult {
    pub fn open(port: u16) -> Self {
        Self {
            port,
            outcome: Outcome::Open,
            error: None,
        }
    }

    pub fn closed(port: u16, error: Error) -> Self {
        Self {
            port,
            outcome: Outcome::Closed,
            error: Some(error),
        }
    }

    pub fn is_open(&self) -> bool {
        self.outcome == Outcome::Open
    }
}

/// Aggregate scan results and progress counters.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ScanReport {
    pub host: String,
    pub protocol: Protocol,
    pub scanned_total: u64,
    pub scanned_done: u64,
    /// Sorted ascending, no duplicates.
    pub open_ports: Vec<u16>,
    pub interrupted: bool,
    pub started_at: String,
}

/// One tcpping attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingSample {
    pub seq: u64,
    pub outcome: Outcome,
    pub latency: Duration,
}

/// Reduction of a non-empty latency record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyStats {
    pub count: usize,
    pub min: Duration,
    pub avg: Duration,
    pub max: Duration,
}

impl LatencyStats {
    /// Returns `None` for an empty record instead of dividing by zero.
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        let (&first, rest) = samples.split_first()?;
        let (mut min, mut max, mut sum) = (first, first, first.as_nanos());
        for &d in rest {
            min = min.min(d);
            max = max.max(d);
            sum += d.as_nanos();
        }
        let avg_nanos = sum / samples.len() as u128;
        let avg = Duration::from_nanos(u64::try_from(avg_nanos).unwrap_or(u64::MAX));
        Some(Self {
            count: samples.len(),
            min,
            avg,
            max,
        })
    }
}
