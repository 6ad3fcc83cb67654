//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Loads the trace file
//! 2. Extracts host operators and attributes kernel launches
//! 3. Binds kernel executions by correlation id
//! 4. Computes metrics and writes one row per (operator, kernel)

use crate::aggregator::{bind_kernels, build_rows, extract_operators, CorrelationIndex};
use crate::output::{write_table, write_table_to_path, ColumnLayout};
use crate::parser::{read_trace, OperatorRow, TraceEvent};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Trace file, echoed as the `modelid` column
    pub trace_path: PathBuf,

    /// Write the table here instead of stdout
    pub output: Option<PathBuf>,

    /// Column layout to emit
    pub layout: ColumnLayout,
}

/// Counts gathered while running the pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSummary {
    pub events: usize,
    pub operators: usize,
    pub operators_with_kernels: usize,
    pub attributed_launches: usize,
    pub kernel_attachments: usize,
    pub rows: usize,
}

impl AnalysisSummary {
    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Events: {} | Operators: {} ({} with kernels) | Launches: {} | Kernels: {} | Rows: {}",
            self.events,
            self.operators,
            self.operators_with_kernels,
            self.attributed_launches,
            self.kernel_attachments,
            self.rows
        )
    }
}

/// Run the correlation pipeline over already loaded events
///
/// **Public** - the library entry point; `model_id` fills the first column
pub fn analyze_events(
    model_id: &str,
    events: &[TraceEvent],
) -> Result<(Vec<OperatorRow>, AnalysisSummary)> {
    info!("Step 2/4: Extracting host operators...");
    let scan = extract_operators(events).context("Failed to extract host operators")?;
    let epoch = scan.epoch_or_zero();
    let attributed_launches = scan.attributed_launches;
    let mut operators = scan.operators;

    debug!("Profiler epoch: {}", epoch);

    info!("Step 3/4: Binding kernels to {} operators...", operators.len());
    let index = CorrelationIndex::build(&operators);
    debug!("{} distinct correlation ids", index.len());
    let kernel_attachments =
        bind_kernels(events, &mut operators, &index).context("Failed to bind kernels")?;

    info!("Step 4/4: Computing device time metrics...");
    let rows = build_rows(model_id, &operators, epoch).context("Failed to compute metrics")?;

    let summary = AnalysisSummary {
        events: events.len(),
        operators: operators.len(),
        operators_with_kernels: operators.iter().filter(|o| !o.kernels.is_empty()).count(),
        attributed_launches,
        kernel_attachments,
        rows: rows.len(),
    };

    Ok((rows, summary))
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Trace file unreadable or malformed
/// * Profiler schema mismatch on a qualifying event
/// * Output write failures
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalysisSummary> {
    let start_time = Instant::now();
    let model_id = args.trace_path.to_string_lossy().into_owned();

    info!("Analyzing trace: {}", model_id);

    info!("Step 1/4: Loading trace events...");
    let events = read_trace(&args.trace_path)
        .with_context(|| format!("Failed to load trace {}", args.trace_path.display()))?;

    let (rows, summary) = analyze_events(&model_id, &events)?;

    match &args.output {
        Some(path) => {
            write_table_to_path(&rows, args.layout, path).context("Failed to write table")?;
            info!("✓ Table written to: {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write_table(&mut handle, &rows, args.layout).context("Failed to write table")?;
        }
    }

    info!("{}", summary.summary());
    info!("Analysis completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(summary)
}
