use std::time::Duration;

use crate::ports::PortRange;
use crate::types::Protocol;

pub const DEFAULT_HOST: &str = "github.com";
pub const DEFAULT_CONCURRENCY: usize = 256;
pub const DEFAULT_PING_PORT: u16 = 443;
pub const DEFAULT_PING_COUNT: i64 = 4;

/// Settings for one port-scan run. Built once from the CLI, read-only after.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub host: String,
    pub range: PortRange,
    pub protocol: Protocol,
    /// Upper bound for each connect attempt.
    pub timeout: Duration,
    /// Suppress per-probe lines.
    pub quiet: bool,
    /// Maximum probes in flight.
    pub concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            range: PortRange::FULL,
            protocol: Protocol::Tcp,
            timeout: Duration::from_secs(1),
            quiet: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ScanConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn range(mut self, min: u16, max: u16) -> Self {
        self.range = PortRange::new(min, max);
        self
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// How many attempts a ping run makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingCount {
    Fixed(u64),
    /// Run until interrupted.
    Infinite,
}

impl PingCount {
    /// Negative values mean "until interrupted".
    pub fn from_flag(n: i64) -> Self {
        u64::try_from(n).map_or(PingCount::Infinite, PingCount::Fixed)
    }

    /// Whether attempt `seq` (1-based) is within the count.
    pub fn allows(self, seq: u64) -> bool {
        match self {
            PingCount::Fixed(n) => seq <= n,
            PingCount::Infinite => true,
        }
    }
}

/// Settings for one tcpping run.
#[derive(Debug, Clone)]
pub struct PingConfig {
    pub host: String,
    pub port: u16,
    pub count: PingCount,
    pub timeout: Duration,
    /// Pause between consecutive attempts.
    pub interval: Duration,
    pub quiet: bool,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PING_PORT,
            count: PingCount::from_flag(DEFAULT_PING_COUNT),
            timeout: Duration::from_secs(1),
            interval: Duration::ZERO,
            quiet: false,
        }
    }
}

impl PingConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn count(mut self, count: PingCount) -> Self {
        self.count = count;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}
