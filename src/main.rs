// CLI entry point
//
// One-shot batch conversion. No config file, no environment layering: the
// input file and output root come straight from the command line.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// Convert a per-symbol Parquet file into a Hive-partitioned directory tree
#[derive(Parser)]
#[command(name = "ticks2hive", about)]
struct Args {
    /// Input Parquet file; must contain a `time` column
    input: PathBuf,

    /// Root directory for the partition tree, created if absent
    output_root: PathBuf,

    /// Log level filter (e.g. info, debug, ticks2hive=trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    ticks2hive_writer::transform(&args.input, &args.output_root)?;
    Ok(())
}

/// Initialize tracing/logging with an env-filter style level string
fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();
}
