use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;

use netprobe_rs::config::{PingConfig, PingCount, DEFAULT_HOST, DEFAULT_PING_COUNT, DEFAULT_PING_PORT};
use netprobe_rs::{logging, ping, report};

/// tcpping — measure TCP connect latency to host:port.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tcpping",
    version,
    about = "Measure TCP connect latency to host:port.",
    long_about = None,
    disable_help_flag = true
)]
struct Cli {
    /// IP or domain to ping.
    #[arg(short = 'h', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Target port.
    #[arg(short = 'p', long, default_value_t = DEFAULT_PING_PORT)]
    port: u16,

    /// Number of attempts; negative runs until interrupted.
    #[arg(
        short = 'c',
        long,
        short_alias = 'n',
        default_value_t = DEFAULT_PING_COUNT,
        allow_negative_numbers = true
    )]
    count: i64,

    /// Timeout of each attempt in seconds.
    #[arg(short = 't', long, default_value_t = 1)]
    timeout: u64,

    /// Delay between attempts in milliseconds.
    #[arg(short = 'i', long = "interval", default_value_t = 0)]
    interval_ms: u64,

    /// Quiet mode: only print the header and stats.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Cli {
    fn to_config(&self) -> PingConfig {
        PingConfig::new(self.host.clone(), self.port)
            .count(PingCount::from_flag(self.count))
            .timeout(Duration::from_secs(self.timeout))
            .interval(Duration::from_millis(self.interval_ms))
            .quiet(self.quiet)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = cli.to_config();

    // Ctrl-C ends the loop; the samples gathered so far are reported.
    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_ctrlc.cancel();
        }
    });

    let samples = ping::tcpping(&config, cancel)
        .await
        .with_context(|| format!("cannot ping {}:{}", config.host, config.port))?;

    print!("{}", report::ping_stats(&samples));
    Ok(())
}
