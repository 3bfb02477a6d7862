//! Trace Evaluation - Main Entry Point

use anyhow::Context;
use clap::Parser;
use runner::{init_logging, load_recording, run_all, InputPaths, Report, Settings};
use std::path::PathBuf;
use std::process;
use tracing::info;

/// Evaluate a recorded or simulated trace against configured requirements
#[derive(Parser, Debug)]
#[command(name = "trace-eval")]
#[command(version)]
#[command(about = "Evaluate signal traces and object outputs against requirement checks")]
struct Args {
    /// Settings file (TOML); environment variables TRACE_EVAL__* override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Signal trace (JSON)
    #[arg(long, value_name = "FILE")]
    trace: Option<PathBuf>,

    /// Ground-truth and simulated outline frames (JSON)
    #[arg(long, value_name = "FILE")]
    polygons: Option<PathBuf>,

    /// Ground-truth object tracks (JSON)
    #[arg(long, value_name = "FILE")]
    ground_truth: Option<PathBuf>,

    /// Detection frames (JSON)
    #[arg(long, value_name = "FILE")]
    detections: Option<PathBuf>,

    /// Report file; stdout when omitted
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Recording name used in the report
    #[arg(long, default_value = "recording")]
    name: String,

    /// Enable verbose logging (DEBUG level)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    if args.verbose {
        settings.log_level = "debug".to_string();
    }
    init_logging(&settings)?;

    info!("=== trace-eval v{} ===", env!("CARGO_PKG_VERSION"));

    let paths = InputPaths {
        trace: args.trace,
        polygons: args.polygons,
        ground_truth: args.ground_truth,
        detections: args.detections,
    };
    let recording = load_recording(args.name.as_str(), &paths);
    let report = Report::new(args.name.as_str(), run_all(&settings, &recording));

    report
        .write_to(args.output.as_deref())
        .context("Failed to write report")?;
    info!("Overall verdict: {}", report.verdict);

    if report.verdict.is_failure() {
        process::exit(1);
    }
    Ok(())
}
