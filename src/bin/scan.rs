use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;

use netprobe_rs::config::{ScanConfig, DEFAULT_CONCURRENCY, DEFAULT_HOST};
use netprobe_rs::types::{Protocol, ScanReport};
use netprobe_rs::{logging, report, scanner};

/// scan — concurrent TCP/UDP connect scanner over a port range.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "scan",
    version,
    about = "Concurrent TCP/UDP connect scanner over a port range.",
    long_about = None,
    disable_help_flag = true
)]
struct Cli {
    /// IP or domain to scan.
    #[arg(short = 'h', long, default_value = DEFAULT_HOST)]
    host: String,

    /// First port of the range (inclusive).
    #[arg(long, default_value_t = 1)]
    min: u16,

    /// Last port of the range (inclusive).
    #[arg(long, default_value_t = 65535)]
    max: u16,

    /// Use UDP instead of TCP.
    #[arg(short = 'u', long)]
    udp: bool,

    /// Timeout per probe in seconds.
    #[arg(short = 't', long, default_value_t = 1)]
    timeout: u64,

    /// Quiet mode: only print the summary.
    #[arg(short = 'n', long)]
    quiet: bool,

    /// Max probes in flight.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Write the report as pretty JSON to this path (optional).
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Cli {
    fn to_config(&self) -> ScanConfig {
        let protocol = if self.udp { Protocol::Udp } else { Protocol::Tcp };
        ScanConfig::new(self.host.clone())
            .range(self.min, self.max)
            .protocol(protocol)
            .timeout(Duration::from_secs(self.timeout))
            .quiet(self.quiet)
            .concurrency(self.concurrency)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = cli.to_config();

    if config.quiet {
        println!("work in quiet mode..");
    }

    // Ctrl-C stops dispatch; whatever completed is still reported.
    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_ctrlc.cancel();
        }
    });

    let results = scanner::scan_with_cancel(&config, cancel)
        .await
        .with_context(|| format!("cannot scan {}", config.host))?;

    print!("{}", report::scan_summary(&results.open_ports));

    if let Some(path) = cli.output.as_deref() {
        write_results_json(path, &results)?;
        eprintln!("Wrote JSON results to {}", path.display());
    }
    Ok(())
}

fn write_results_json(path: &Path, results: &ScanReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}
