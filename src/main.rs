//! OpKernel Trace CLI
//!
//! Reads a PyTorch profiler trace and prints one CSV row per
//! (host operator, GPU kernel) pair.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use opkernel_trace::commands::{execute_analyze, AnalyzeArgs};
use opkernel_trace::output::ColumnLayout;

/// OpKernel Trace - attribute GPU kernels to PyTorch operators
#[derive(Parser, Debug)]
#[command(name = "opkernel-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the profiler trace JSON (echoed as the modelid column)
    trace: PathBuf,

    /// Write the table to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit the extended column layout (operator timing, conv shapes, kernel times)
    #[arg(long)]
    extended: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging (stderr; stdout carries the table)
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let layout = if cli.extended {
        ColumnLayout::Extended
    } else {
        ColumnLayout::Standard
    };

    execute_analyze(AnalyzeArgs {
        trace_path: cli.trace,
        output: cli.output,
        layout,
    })?;

    Ok(())
}
