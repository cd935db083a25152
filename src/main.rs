//! `date-accuracy-report`: run the synthetic date accuracy report.
//!
//! With no arguments this reproduces the reference run (20 rows, seed 42)
//! and writes both charts under `target/date-accuracy/`.
//!
//! ```bash
//! cargo run --release
//! cargo run --release -- --rows 500 --seed 7 --json
//! RUST_LOG=date_accuracy=debug cargo run
//! ```

use clap::Parser;
use date_accuracy::config::DEFAULT_LOG_FILTER;
use date_accuracy::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "date-accuracy-report")]
#[command(about = "Score synthetic predicted dates against ground truth")]
#[command(version)]
struct Args {
    /// Number of generated rows
    #[arg(short, long, default_value_t = date_accuracy::config::DEFAULT_ROWS)]
    rows: usize,

    /// RNG seed
    #[arg(short, long, default_value_t = date_accuracy::config::DEFAULT_SEED)]
    seed: u64,

    /// Directory for the rendered charts
    #[arg(short, long, value_name = "DIR", default_value = date_accuracy::config::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Print the report as JSON
    #[arg(short, long)]
    json: bool,

    /// Skip chart rendering
    #[arg(long)]
    no_plots: bool,

    /// Print run timings to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ReportConfig::default()
        .with_rows(args.rows)
        .with_seed(args.seed)
        .with_output_dir(args.output_dir);

    let mut ctx = RunContext::from_config("date-accuracy", &config)?;
    tracing::info!(rows = config.num_rows, seed = config.seed, "starting run");

    let mut report = DateAccuracyReport::build(&config, &mut ctx)?;
    if !args.no_plots {
        report.render(&mut ctx, &config)?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        report.write_json(&mut out)?;
    } else {
        report.write_text(&mut out)?;
    }
    out.flush()?;

    if args.verbose {
        ctx.report(&mut std::io::stderr().lock())?;
    }
    Ok(())
}
