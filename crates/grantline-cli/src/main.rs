//! grantline - NIH RePORTER award fetcher
//!
//! Pages every (state, fiscal year) partition of the RePORTER project
//! search into `{outdir}/{state}/{year}/{first}-{last}.json` files,
//! resuming from whatever pages already exist.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use grantline_core::fmt_num;
use grantline_reporter::{PartitionMode, Summary};

mod config;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "grantline")]
#[command(about = "Fetch NIH RePORTER awards by state and fiscal year")]
#[command(version)]
struct Cli {
    /// Output directory for page files
    #[arg(long, required_unless_present = "show_config")]
    outdir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Config file path (default: ./grantline.toml or ~/.config/grantline/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only fetch these states (comma-separated codes)
    #[arg(long, value_delimiter = ',')]
    states: Option<Vec<String>>,

    /// Stop after the first partition that has records
    #[arg(long)]
    first_non_empty: bool,

    /// First fiscal year of the project end-date chunks
    #[arg(long)]
    start_year: Option<i32>,

    /// Minimum milliseconds between page fetches
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,
}

/// Merge file config and CLI overrides into the pipeline config
fn build_config(cli: &Cli, file: &Config, output_dir: PathBuf) -> Result<grantline_reporter::Config> {
    let codes = cli.states.as_ref().unwrap_or(&file.fetch.states);
    let states = grantline_reporter::plan::select_states(codes)?;

    let partition_mode = if cli.first_non_empty || file.fetch.first_non_empty {
        PartitionMode::FirstNonEmpty
    } else {
        PartitionMode::All
    };

    let config = grantline_reporter::Config {
        output_dir,
        endpoint: file.api.endpoint.clone(),
        states,
        start_year: cli.start_year.unwrap_or(file.fetch.start_year),
        chunk_count: file.fetch.chunk_count,
        delay: Duration::from_millis(cli.delay_ms.unwrap_or(file.fetch.delay_ms)),
        partition_mode,
    };
    config.validate()?;
    Ok(config)
}

fn print_config(config: &grantline_reporter::Config, http: &grantline_core::HttpConfig) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let chunks = config.chunks();
    let years = match (chunks.first(), chunks.last()) {
        (Some(first), Some(last)) => format!("{first} .. {last}"),
        _ => "-".to_string(),
    };

    table.add_row(vec![
        "Output directory",
        &config.output_dir.display().to_string(),
    ]);
    table.add_row(vec!["Endpoint", &config.endpoint]);
    table.add_row(vec![
        "States",
        &format!("{} ({})", config.states.len(), config.states.join(",")),
    ]);
    table.add_row(vec!["Year chunks", &years]);
    table.add_row(vec!["Delay", &format!("{}ms", config.delay.as_millis())]);
    table.add_row(vec!["Mode", &format!("{:?}", config.partition_mode)]);
    table.add_row(vec![
        "Connect timeout",
        &format!("{}s", http.connect_timeout.as_secs()),
    ]);
    table.add_row(vec![
        "Request timeout",
        &format!("{}s", http.request_timeout.as_secs()),
    ]);

    eprintln!("\n{table}");
}

/// Print a key-value summary table on stderr
fn print_summary(summary: &Summary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("RePORTER").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let rows = [
        ("Partitions probed", summary.partitions_probed.to_string()),
        ("Partitions empty", summary.partitions_empty.to_string()),
        ("Pages written", summary.pages_written.to_string()),
        ("Pages already present", summary.pages_skipped.to_string()),
        ("Pages failed", summary.pages_failed.to_string()),
        ("Records written", fmt_num(summary.records_written)),
        ("Elapsed", format!("{:.1}s", summary.elapsed.as_secs_f64())),
    ];
    for (label, value) in rows {
        let cell = if label == "Pages failed" && summary.pages_failed > 0 {
            Cell::new(value).fg(Color::Red)
        } else {
            Cell::new(value)
        };
        table.add_row(vec![Cell::new(label), cell]);
    }

    eprintln!("\n{table}");
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let progress = grantline_core::ProgressContext::new();

    // Log lines are the run's progress record, so info stays on in a TTY too
    let multi = progress.is_tty().then(|| progress.multi());
    grantline_core::init_logging(false, cli.debug, multi);

    let file_config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    let http_config = grantline_core::HttpConfig {
        connect_timeout: Duration::from_secs(file_config.http.connect_timeout),
        request_timeout: Duration::from_secs(file_config.http.request_timeout),
    };

    let output_dir = cli.outdir.clone().unwrap_or_default();
    let config = build_config(&cli, &file_config, output_dir)?;

    if cli.show_config {
        print_config(&config, &http_config);
        return Ok(ExitCode::SUCCESS);
    }
    anyhow::ensure!(cli.outdir.is_some(), "must provide an output directory");

    grantline_core::set_http_config(http_config);
    grantline_core::install_signal_handlers().context("Failed to install signal handlers")?;

    let summary = grantline_reporter::run(&config, &progress)?;
    print_summary(&summary);

    if summary.interrupted {
        return Ok(ExitCode::from(130));
    }
    Ok(ExitCode::SUCCESS)
}
