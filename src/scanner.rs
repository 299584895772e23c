use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::report;
use crate::resolve::resolve_host;
use crate::types::{ProbeResult, Protocol, ScanReport};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use ::time::{format_description::well_known, OffsetDateTime};

/// Probe a single endpoint once, bounded by `timeout`.
///
/// Any successfully opened socket is dropped before returning. Timeouts,
/// refusals and other connect errors all produce a closed result.
pub async fn probe(addr: SocketAddr, protocol: Protocol, timeout: Duration) -> ProbeResult {
    let attempt = async {
        match protocol {
            Protocol::Tcp => connect_tcp(addr).await,
            Protocol::Udp => connect_udp(addr).await,
        }
    };
    match time::timeout(timeout, attempt).await {
        Ok(Ok(())) => ProbeResult::open(addr.port()),
        Ok(Err(e)) => ProbeResult::closed(addr.port(), e),
        Err(_) => ProbeResult::closed(addr.port(), Error::ConnectTimeout(timeout)),
    }
}

async fn connect_tcp(addr: SocketAddr) -> Result<()> {
    let stream = TcpStream::connect(addr).await.map_err(Error::from_connect)?;
    drop(stream);
    Ok(())
}

/// UDP has no handshake: associating a local socket with the remote address
/// is all a connect can establish.
async fn connect_udp(addr: SocketAddr) -> Result<()> {
    let local: SocketAddr = match addr.ip() {
        IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(local).await.map_err(Error::Connect)?;
    socket.connect(addr).await.map_err(Error::from_connect)?;
    Ok(())
}

/// Resolve the configured host and scan its port range.
///
/// Per-probe lines go to stdout unless `config.quiet` is set.
pub async fn scan(config: &ScanConfig) -> Result<ScanReport> {
    scan_with_cancel(config, CancellationToken::new()).await
}

/// Variant that accepts a `CancellationToken` to stop dispatching early.
/// Probes already in flight still complete and are reported.
pub async fn scan_with_cancel(config: &ScanConfig, cancel: CancellationToken) -> Result<ScanReport> {
    let host = config.host.clone();
    let quiet = config.quiet;
    scan_with_observer(config, cancel, move |res| {
        if !quiet {
            println!("{}", report::probe_line(&host, res));
        }
    })
    .await
}

/// Variant that hands every probe result to `on_result` from the collector task.
pub async fn scan_with_observer<F>(
    config: &ScanConfig,
    cancel: CancellationToken,
    on_result: F,
) -> Result<ScanReport>
where
    F: FnMut(&ProbeResult) + Send + 'static,
{
    let ip = resolve_host(&config.host).await?;
    Ok(scan_ip(ip, config, cancel, on_result).await)
}

/// Scan an already-resolved address with a bounded worker pool.
///
/// - Limits probes in flight using a `Semaphore`.
/// - Workers send results over a channel to a single collector task, the only
///   owner of the open-port list.
/// - Joins every dispatched worker before building the report.
pub async fn scan_ip<F>(
    ip: IpAddr,
    config: &ScanConfig,
    cancel: CancellationToken,
    mut on_result: F,
) -> ScanReport
where
    F: FnMut(&ProbeResult) + Send + 'static,
{
    let started_at = now_rfc3339();
    let concurrency = config.concurrency.clamp(1, 5_000);
    info!(
        host = %config.host,
        %ip,
        protocol = %config.protocol,
        min = config.range.min,
        max = config.range.max,
        concurrency,
        "starting scan"
    );

    let (tx, mut rx) = mpsc::channel::<ProbeResult>(concurrency);
    let collector = tokio::spawn(async move {
        let mut open = Vec::new();
        let mut done = 0u64;
        while let Some(res) = rx.recv().await {
            done += 1;
            on_result(&res);
            match &res.error {
                None => open.push(res.port),
                Some(e) => debug!(port = res.port, error = %e, "probe closed"),
            }
        }
        (open, done)
    });

    let sem = Arc::new(Semaphore::new(concurrency));
    let mut set = JoinSet::new();
    let mut interrupted = false;

    for port in config.range {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = sem.clone().acquire_owned() => permit.ok(),
        };
        let Some(permit) = permit else {
            interrupted = true;
            break;
        };
        let tx = tx.clone();
        let protocol = config.protocol;
        let timeout = config.timeout;

        set.spawn(async move {
            let _permit = permit;
            let res = probe(SocketAddr::new(ip, port), protocol, timeout).await;
            // Receiver lives until every sender is dropped.
            let _ = tx.send(res).await;
        });
    }
    drop(tx);

    while let Some(_res) = set.join_next().await {}

    let (mut open_ports, scanned_done) = match collector.await {
        Ok(collected) => collected,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(_) => (Vec::new(), 0),
    };
    report::sort_ports(&mut open_ports);

    if interrupted {
        warn!(scanned_done, "scan interrupted, reporting partial results");
    }
    info!(scanned_done, open = open_ports.len(), "scan finished");

    ScanReport {
        host: config.host.clone(),
        protocol: config.protocol,
        scanned_total: config.range.len(),
        scanned_done,
        open_ports,
        interrupted,
        started_at,
    }
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn tcp_probe_open_on_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let res = probe(addr, Protocol::Tcp, Duration::from_secs(1)).await;
        assert_eq!(res.outcome, Outcome::Open);
        assert!(res.error.is_none());
    }

    #[tokio::test]
    async fn tcp_probe_closed_after_listener_dropped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let res = probe(addr, Protocol::Tcp, Duration::from_secs(1)).await;
        assert_eq!(res.outcome, Outcome::Closed);
        assert!(res.error.is_some());
    }

    #[tokio::test]
    async fn udp_probe_associates_with_loopback() {
        let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
        let res = probe(addr, Protocol::Udp, Duration::from_secs(1)).await;
        assert_eq!(res.outcome, Outcome::Open);
    }

    #[tokio::test]
    async fn empty_range_reports_nothing() {
        let cfg = ScanConfig::new("127.0.0.1").range(10, 5).quiet(true);
        let report = scan_ip(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            &cfg,
            CancellationToken::new(),
            |_| {},
        )
        .await;
        assert_eq!(report.scanned_total, 0);
        assert_eq!(report.scanned_done, 0);
        assert!(report.open_ports.is_empty());
        assert!(!report.interrupted);
    }

    #[tokio::test]
    async fn cancelled_before_start_dispatches_nothing() {
        let cfg = ScanConfig::new("127.0.0.1").range(1, 100).quiet(true);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = scan_ip(IpAddr::V4(Ipv4Addr::LOCALHOST), &cfg, cancel, |_| {}).await;
        assert!(report.interrupted);
        assert_eq!(report.scanned_done, 0);
        assert_eq!(report.scanned_total, 100);
    }
}
