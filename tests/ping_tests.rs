use std::net::SocketAddr;
use std::time::Duration;

use netprobe_rs::config::{PingConfig, PingCount};
use netprobe_rs::ping::{ping_loop, tcpping};
use netprobe_rs::report::ping_stats;
use netprobe_rs::types::Outcome;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

async fn listener() -> (TcpListener, SocketAddr) {
    let l = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = l.local_addr().expect("local addr");
    (l, addr)
}

#[tokio::test]
async fn fixed_count_makes_exactly_n_attempts() {
    let (_l, addr) = listener().await;
    let cfg = PingConfig::new("127.0.0.1", addr.port())
        .count(PingCount::Fixed(4))
        .quiet(true);
    let mut outcomes = Vec::new();
    let samples = ping_loop(addr, &cfg, CancellationToken::new(), |s| outcomes.push(s.outcome)).await;
    assert_eq!(samples.len(), 4);
    assert!(outcomes.iter().all(|o| *o == Outcome::Open));
}

#[tokio::test]
async fn interrupt_after_three_attempts_reports_three_samples() {
    let (_l, addr) = listener().await;
    let cfg = PingConfig::new("127.0.0.1", addr.port())
        .count(PingCount::Infinite)
        .quiet(true);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let samples = ping_loop(addr, &cfg, cancel, |s| {
        if s.seq == 3 {
            trigger.cancel();
        }
    })
    .await;
    assert_eq!(samples.len(), 3);
    assert!(ping_stats(&samples).contains("total: 3\n"));
}

#[tokio::test]
async fn interrupt_during_interval_stops_promptly() {
    let (_l, addr) = listener().await;
    let cfg = PingConfig::new("127.0.0.1", addr.port())
        .count(PingCount::Infinite)
        .interval(Duration::from_secs(30))
        .quiet(true);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });
    let samples = tokio::time::timeout(
        Duration::from_secs(5),
        ping_loop(addr, &cfg, cancel, |_| {}),
    )
    .await
    .expect("loop should stop on cancel");
    assert_eq!(samples.len(), 1);
}

#[tokio::test]
async fn closed_port_samples_are_still_recorded() {
    let (l, addr) = listener().await;
    drop(l);
    let cfg = PingConfig::new("127.0.0.1", addr.port())
        .count(PingCount::Fixed(2))
        .timeout(Duration::from_millis(500))
        .quiet(true);
    let mut outcomes = Vec::new();
    let samples = ping_loop(addr, &cfg, CancellationToken::new(), |s| outcomes.push(s.outcome)).await;
    assert_eq!(samples.len(), 2);
    assert_eq!(outcomes, vec![Outcome::Closed, Outcome::Closed]);
}

#[tokio::test]
async fn tcpping_resolves_and_runs() {
    let (_l, addr) = listener().await;
    let cfg = PingConfig::new("127.0.0.1", addr.port())
        .count(PingCount::Fixed(2))
        .quiet(true);
    let samples = tcpping(&cfg, CancellationToken::new()).await.expect("ping ok");
    assert_eq!(samples.len(), 2);
}

#[tokio::test]
async fn tcpping_fails_on_unresolvable_host() {
    let cfg = PingConfig::new("no-such-host.invalid", 443).count(PingCount::Fixed(1));
    let err = tcpping(&cfg, CancellationToken::new()).await.unwrap_err();
    assert!(err.is_fatal());
}
