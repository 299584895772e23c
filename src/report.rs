//! Text rendering for scan summaries, ping lines and latency stats.

use std::fmt::Write as _;
use std::net::SocketAddr;
use std::time::Duration;

use crate::types::{LatencyStats, PingSample, ProbeResult};

const PORTS_PER_LINE: usize = 4;

/// `host:port [open]` or `host:port [close]`.
pub fn probe_line(host: &str, res: &ProbeResult) -> String {
    format!("{}:{} [{}]", host, res.port, res.outcome.label())
}

/// Summary line plus the ports, four per line, then a blank line.
///
/// `open_ports` is expected sorted; see [`sort_ports`].
pub fn scan_summary(open_ports: &[u16]) -> String {
    let n = open_ports.len();
    let mut out = if n < 2 {
        format!("Summary: {n} port is open\n")
    } else {
        format!("Summary: {n} ports are open\n")
    };
    for chunk in open_ports.chunks(PORTS_PER_LINE) {
        let line: Vec<String> = chunk.iter().map(u16::to_string).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out.push('\n');
    out
}

pub fn sort_ports(ports: &mut [u16]) {
    ports.sort_unstable();
}

/// `TCPPING host (ip):`
pub fn ping_header(host: &str, target: SocketAddr) -> String {
    format!("TCPPING {} ({}):", host, target.ip())
}

/// `seq   1: 1.2.3.4:443[open] 12.345ms`
pub fn ping_line(target: SocketAddr, sample: &PingSample) -> String {
    format!(
        "seq{:4}: {}[{}] {}ms",
        sample.seq,
        target,
        sample.outcome.label(),
        format_ms(sample.latency)
    )
}

/// Final block of a ping run. Handles the empty record without dividing.
pub fn ping_stats(samples: &[Duration]) -> String {
    let mut out = String::from("----------\n");
    let _ = writeln!(out, "total: {}", samples.len());
    match LatencyStats::from_samples(samples) {
        Some(stats) => {
            let _ = writeln!(
                out,
                "min/avg/max = {}/{}/{}ms",
                format_ms(stats.min),
                format_ms(stats.avg),
                format_ms(stats.max)
            );
        }
        None => out.push_str("no attempts completed\n"),
    }
    out
}

/// Milliseconds with microsecond resolution.
pub fn format_ms(d: Duration) -> String {
    format!("{:.3}", d.as_secs_f64() * 1000.0)
}
