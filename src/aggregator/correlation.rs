//! Correlation between kernel launches and host operators.
//!
//! A `cudaLaunchKernel` runtime call carries a correlation id that the
//! device-side kernel event repeats. Launches are attributed to every host
//! interval that strictly contains them, so nested intervals may share an
//! id. `CorrelationIndex` is the resulting id -> interval join table.

use crate::parser::{HostOperatorInterval, Timestamp, TraceEvent};
use crate::utils::config::{LAUNCH_FUNCTION, RUNTIME_CATEGORIES};
use std::collections::HashMap;

/// True for complete `cudaLaunchKernel` calls in a runtime category
pub fn is_kernel_launch(event: &TraceEvent) -> bool {
    event.has_category(RUNTIME_CATEGORIES)
        && event.is_complete()
        && event.name.eq_ignore_ascii_case(LAUNCH_FUNCTION)
}

/// Append `correlation_id` to every interval strictly containing
/// `[start, end)`
///
/// Returns the number of intervals the launch was attributed to.
pub fn attribute_launch(
    intervals: &mut [HostOperatorInterval],
    correlation_id: u64,
    start: Timestamp,
    end: Timestamp,
) -> usize {
    let mut attributed = 0;
    for interval in intervals.iter_mut() {
        if interval.strictly_contains(start, end) {
            interval.correlation_ids.push(correlation_id);
            attributed += 1;
        }
    }
    attributed
}

/// Many-to-many join from correlation id to host interval positions
#[derive(Debug, Default)]
pub struct CorrelationIndex {
    by_id: HashMap<u64, Vec<usize>>,
}

impl CorrelationIndex {
    /// Build the index from finalized intervals
    ///
    /// Positions are stored in ascending order, once per interval.
    pub fn build(intervals: &[HostOperatorInterval]) -> Self {
        let mut by_id: HashMap<u64, Vec<usize>> = HashMap::new();

        for (position, interval) in intervals.iter().enumerate() {
            for &id in &interval.correlation_ids {
                let positions = by_id.entry(id).or_default();
                if positions.last() != Some(&position) {
                    positions.push(position);
                }
            }
        }

        Self { by_id }
    }

    /// Interval positions holding `correlation_id`, in discovery order
    pub fn lookup(&self, correlation_id: u64) -> &[usize] {
        self.by_id
            .get(&correlation_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct correlation ids
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
