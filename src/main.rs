use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use sysinfo::System;
use sysmon::config::{self, load_config, load_config_from_path};
use sysmon::report::{CsvLog, Reporter};
use sysmon::session::{self, TickPlan};
use sysmon::system::sampler::Sampler;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sysmon",
    version,
    about = "Sample CPU, memory and disk utilization at a fixed interval"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds between samples (default: 1)
    #[arg(short, long, value_name = "SECONDS")]
    interval: Option<u64>,

    /// Number of samples to take; -1 or absent means until interrupted
    #[arg(
        short,
        long,
        value_name = "N",
        allow_negative_numbers = true,
        value_parser = parse_sample_count
    )]
    count: Option<SampleCount>,

    /// Write samples to a CSV file, truncating it first
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Mount path whose disk usage is reported (default: /)
    #[arg(short, long, value_name = "PATH")]
    disk: Option<PathBuf>,
}

/// `-c` value; `None` is the `-1` "run forever" form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SampleCount(Option<u64>);

fn parse_sample_count(raw: &str) -> Result<SampleCount, String> {
    match raw.parse::<i64>() {
        Ok(-1) => Ok(SampleCount(None)),
        Ok(n) if n >= 0 => Ok(SampleCount(Some(n as u64))),
        _ => Err(format!("`{raw}` is not a sample count (use N >= 0, or -1 for no limit)")),
    }
}

struct Settings {
    plan: TickPlan,
    disk_path: PathBuf,
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    let settings = load_settings_for_cli(&cli);

    tracing::debug!(
        host = %System::host_name().unwrap_or_default(),
        os = %System::long_os_version().unwrap_or_default(),
        interval = ?settings.plan.interval,
        count = ?settings.plan.count,
        "starting session"
    );

    let csv = match &settings.log_file {
        Some(path) => Some(
            CsvLog::create(path)
                .wrap_err_with(|| format!("cannot create log file {}", path.display()))?,
        ),
        None => None,
    };
    let mut reporter = Reporter::new(stdout().lock(), csv);
    let mut sampler = Sampler::new();

    let ticks = session::run(
        &mut sampler,
        &mut reporter,
        &settings.disk_path,
        settings.plan,
        stop_signal(),
    )
    .await?;

    tracing::debug!(ticks, "session finished");
    Ok(())
}

fn init_tracing() {
    // stdout carries the report lines, so diagnostics go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn stop_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for ctrl-c; run until count is reached");
        std::future::pending::<()>().await;
    }
}

fn load_settings_for_cli(cli: &Cli) -> Settings {
    let config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };
    merge_settings(cli, config)
}

fn merge_settings(cli: &Cli, config: config::Config) -> Settings {
    let config::Config { sampling, output } = config;
    Settings {
        plan: TickPlan {
            interval: Duration::from_secs(cli.interval.unwrap_or(sampling.interval_secs)),
            count: cli.count.map_or(sampling.count, |SampleCount(n)| n),
        },
        disk_path: cli.disk.clone().unwrap_or(sampling.disk_path),
        log_file: cli.log.clone().or(output.log_file),
    }
}
