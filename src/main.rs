use std::path::PathBuf;

use clap::Parser;
use timeline2csv::config::Config;
use timeline2csv::convert::{ConversionOutcome, convert};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Flatten a Timeline JSON export into a CSV table.
#[derive(Parser, Debug)]
#[command(name = "timeline2csv", version, about)]
struct Cli {
    /// Timeline JSON export to read
    input: Option<PathBuf>,

    /// CSV file to write (parent directories are created)
    output: Option<PathBuf>,

    /// JSON file providing `input_path` / `output_path`
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    // Failures are reported, never turned into a distinct exit status.
    if let Err(e) = run(cli) {
        error!("An unexpected error occurred: {e:?}");
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // 1. Resolve paths
    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.input, cli.output);
    config.validate()?;

    // 2. Convert
    match convert(&config.input_path, &config.output_path)? {
        ConversionOutcome::Written(summary) => info!(
            "Done: {} rows x {} columns from {} positions and {} segments",
            summary.rows, summary.columns, summary.positions_found, summary.segments_found
        ),
        ConversionOutcome::Empty { .. } => info!("Done: no rows extracted"),
    }

    Ok(())
}
