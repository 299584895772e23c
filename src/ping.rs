use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PingConfig;
use crate::error::{Error, Result};
use crate::report;
use crate::resolve::resolve_host;
use crate::types::{Outcome, PingSample};

/// One timed connect/close cycle.
///
/// Latency is recorded whether or not the connect succeeds, so a failed
/// attempt yields a sample bounded by `timeout`.
pub async fn attempt(target: SocketAddr, seq: u64, timeout: Duration) -> PingSample {
    let start = Instant::now();
    let res = time::timeout(timeout, TcpStream::connect(target)).await;
    let latency = start.elapsed();

    let connected = match res {
        Ok(Ok(stream)) => {
            drop(stream);
            true
        }
        Ok(Err(e)) => {
            debug!(seq, %target, error = %Error::from_connect(e), "attempt failed");
            false
        }
        Err(_) => {
            debug!(seq, %target, error = %Error::ConnectTimeout(timeout), "attempt failed");
            false
        }
    };

    PingSample {
        seq,
        outcome: Outcome::from_connected(connected),
        latency,
    }
}

/// Run attempts against `target` until the count is exhausted or `cancel` fires.
///
/// An attempt in flight when cancellation arrives is abandoned and not
/// recorded. Returns the latencies in attempt order.
pub async fn ping_loop<F>(
    target: SocketAddr,
    config: &PingConfig,
    cancel: CancellationToken,
    mut on_sample: F,
) -> Vec<Duration>
where
    F: FnMut(&PingSample),
{
    let mut samples = Vec::new();
    let mut seq = 1u64;

    while config.count.allows(seq) {
        let sample = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            s = attempt(target, seq, config.timeout) => s,
        };
        samples.push(sample.latency);
        on_sample(&sample);

        if !config.interval.is_zero() && config.count.allows(seq + 1) {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = time::sleep(config.interval) => {}
            }
        }
        seq += 1;
    }

    if cancel.is_cancelled() {
        warn!(attempts = samples.len(), "ping interrupted");
    }
    samples
}

/// Resolve the host, print the header and run the loop.
///
/// Per-attempt lines go to stdout unless `config.quiet` is set. Resolution
/// failure is returned before any attempt is made.
pub async fn tcpping(config: &PingConfig, cancel: CancellationToken) -> Result<Vec<Duration>> {
    let ip = resolve_host(&config.host).await?;
    let target = SocketAddr::new(ip, config.port);
    info!(host = %config.host, %target, count = ?config.count, "starting tcpping");

    println!("{}", report::ping_header(&config.host, target));
    let quiet = config.quiet;
    let samples = ping_loop(target, config, cancel, |sample| {
        if !quiet {
            println!("{}", report::ping_line(target, sample));
        }
    })
    .await;
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PingCount;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn attempt_against_listener_is_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let sample = attempt(addr, 7, Duration::from_secs(1)).await;
        assert_eq!(sample.seq, 7);
        assert_eq!(sample.outcome, Outcome::Open);
        assert!(sample.latency < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn closed_attempt_still_records_latency() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let sample = attempt(addr, 1, Duration::from_secs(1)).await;
        assert_eq!(sample.outcome, Outcome::Closed);
        assert!(sample.latency <= Duration::from_millis(1100));
    }

    #[tokio::test]
    async fn zero_count_makes_no_attempts() {
        let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
        let cfg = PingConfig::new("127.0.0.1", 9).count(PingCount::Fixed(0));
        let samples = ping_loop(addr, &cfg, CancellationToken::new(), |_| {}).await;
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn sequence_numbers_start_at_one() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let cfg = PingConfig::new("127.0.0.1", addr.port()).count(PingCount::Fixed(3));
        let mut seqs = Vec::new();
        let samples = ping_loop(addr, &cfg, CancellationToken::new(), |s| seqs.push(s.seq)).await;
        assert_eq!(samples.len(), 3);
        assert_eq!(seqs, vec![1, 2, 3]);
    }
}
