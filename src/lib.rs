//! OpKernel Trace
//!
//! Correlates host-side operators in a PyTorch profiler trace with the GPU
//! kernels they launched, and flattens the result into one table row per
//! (operator, kernel) pair.
//!
//! ## Getting Started
//!
//! ```bash
//! opkernel-trace trace.json > kernels.csv
//! ```
//!
//! The pipeline is also usable as a library:
//!
//! ```ignore
//! let events = opkernel_trace::parser::read_trace("trace.json")?;
//! let (rows, summary) = opkernel_trace::commands::analyze_events("trace.json", &events)?;
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
