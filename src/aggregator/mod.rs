//! Correlation of host operators with device kernels.
//!
//! This module transforms the raw event list into:
//! - Non-dominated host operator intervals (with launch correlation ids)
//! - Kernel executions bound to those intervals
//! - Per-operator device time metrics and flattened rows

pub mod correlation;
pub mod kernels;
pub mod metrics;
pub mod operators;

// Re-export main types and functions
pub use correlation::{attribute_launch, is_kernel_launch, CorrelationIndex};
pub use kernels::{bind_kernels, is_kernel_execution};
pub use metrics::{build_rows, summarize, OperatorMetrics};
pub use operators::{extract_operators, is_host_operator, OperatorScan, OperatorSet};
