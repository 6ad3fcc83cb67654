//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;

// Re-export main command functions
pub use analyze::{analyze_events, execute_analyze, AnalysisSummary, AnalyzeArgs};
