//! Event model and output row schema.
//!
//! Host operator intervals and device kernel intervals are built by the
//! aggregator phases; `OperatorRow` is the flattened record written out
//! for every (operator, kernel) pair.

use super::trace_event::Timestamp;
use serde_json::Value;

/// One host-side operator invocation
#[derive(Debug, Clone, PartialEq)]
pub struct HostOperatorInterval {
    /// Operator name (e.g. `aten::conv2d`)
    pub name: String,

    /// Start time in ticks
    pub start: Timestamp,

    /// End time in ticks (`ts + dur`)
    pub end: Timestamp,

    /// Input shape descriptors, verbatim from `args."Input Dims"`
    pub input_dims: Vec<Value>,

    /// Correlation ids of kernel launches strictly nested in this interval
    pub correlation_ids: Vec<u64>,

    /// Kernels bound through `correlation_ids`, in trace order
    pub kernels: Vec<DeviceKernelInterval>,
}

impl HostOperatorInterval {
    pub fn new(
        name: impl Into<String>,
        start: Timestamp,
        end: Timestamp,
        input_dims: Vec<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            input_dims,
            correlation_ids: Vec::new(),
            kernels: Vec::new(),
        }
    }

    pub fn duration(&self) -> Timestamp {
        self.end - self.start
    }

    /// Strict containment: starts after `start` and ends before `end`
    pub fn strictly_contains(&self, start: Timestamp, end: Timestamp) -> bool {
        self.start < start && self.end > end
    }

    /// Decide which of `self` (the newly seen interval) and `existing`
    /// has to go.
    ///
    /// The comparison is deliberately asymmetric: on a shared boundary the
    /// later interval loses, and exact duplicates with different names keep
    /// only the first one seen.
    pub fn dominance_against(&self, existing: &HostOperatorInterval) -> Dominance {
        let (ts, te) = (self.start, self.end);
        let (es, ee) = (existing.start, existing.end);

        if (te <= ee && ts > es)
            || (te < ee && ts >= es)
            || (te == ee && ts == es && self.name != existing.name)
        {
            Dominance::Candidate
        } else if te >= ee && ts < es {
            Dominance::Existing
        } else {
            Dominance::Neither
        }
    }
}

/// Outcome of comparing a candidate interval against an accepted one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// The candidate is nested in (or duplicates) the existing interval
    Candidate,
    /// The candidate strictly encloses the existing interval
    Existing,
    Neither,
}

/// One device kernel execution
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceKernelInterval {
    pub name: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub correlation_id: u64,

    // Launch metadata is kept as the profiler wrote it
    pub registers_per_thread: Value,
    pub shared_memory: Value,
    pub warps_per_sm: Value,
    pub grid: Value,
    pub block: Value,
    pub stream: Value,

    /// Not reported by the profiler; always empty
    pub blocks_per_sm: Option<Value>,
}

impl DeviceKernelInterval {
    pub fn duration(&self) -> Timestamp {
        self.end - self.start
    }
}

/// Flattened output record for one (operator, kernel) pair
///
/// Aggregate columns repeat on every row of the same operator. All
/// timestamps are in ticks, relative to the profiler epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorRow {
    pub model_id: String,
    /// 1-based position of the operator among surviving intervals
    pub layer_id: usize,
    pub operator_name: String,
    pub cuda_time: Timestamp,
    pub cuda_time_no_overlap: Timestamp,
    pub operator_duration: Timestamp,
    pub operator_start: Timestamp,
    pub operator_end: Timestamp,
    pub operator_correlation_ids: Vec<u64>,
    pub input_dims: Vec<Value>,
    pub input_products: i64,
    pub input_size: Value,
    pub conv_kernel_size: Value,
    pub bias: Value,
    pub kernel_duration: Timestamp,
    pub kernel_start: Timestamp,
    pub kernel_end: Timestamp,
    pub kernel_correlation_id: u64,
    pub blocks_per_sm: Option<Value>,
    pub warps_per_sm: Value,
    pub stream: Value,
    pub grid: Value,
    pub block: Value,
    pub kernel_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(name: &str, start: Timestamp, end: Timestamp) -> HostOperatorInterval {
        HostOperatorInterval::new(name, start, end, Vec::new())
    }

    #[test]
    fn test_nested_candidate_is_dominated() {
        let outer = op("outer", 0, 100);
        assert_eq!(op("inner", 10, 20).dominance_against(&outer), Dominance::Candidate);
        // Shared start, earlier end
        assert_eq!(op("inner", 0, 50).dominance_against(&outer), Dominance::Candidate);
        // Shared end, later start
        assert_eq!(op("inner", 50, 100).dominance_against(&outer), Dominance::Candidate);
    }

    #[test]
    fn test_enclosing_candidate_dominates() {
        let inner = op("inner", 10, 20);
        assert_eq!(op("outer", 0, 100).dominance_against(&inner), Dominance::Existing);
        assert_eq!(op("outer", 0, 20).dominance_against(&inner), Dominance::Existing);
    }

    #[test]
    fn test_identical_extent_tie_break() {
        let first = op("aten::linear", 50, 150);
        assert_eq!(op("aten::addmm", 50, 150).dominance_against(&first), Dominance::Candidate);
        assert_eq!(op("aten::linear", 50, 150).dominance_against(&first), Dominance::Neither);
    }

    #[test]
    fn test_shared_start_longer_candidate_is_neither() {
        let existing = op("a", 0, 50);
        assert_eq!(op("b", 0, 100).dominance_against(&existing), Dominance::Neither);
    }

    #[test]
    fn test_disjoint_and_overlapping_are_neither() {
        let existing = op("a", 0, 50);
        assert_eq!(op("b", 60, 70).dominance_against(&existing), Dominance::Neither);
        assert_eq!(op("b", 40, 70).dominance_against(&existing), Dominance::Neither);
    }

    #[test]
    fn test_strict_containment() {
        let host = op("a", 100, 200);
        assert!(host.strictly_contains(110, 120));
        assert!(!host.strictly_contains(100, 120));
        assert!(!host.strictly_contains(110, 200));
    }
}
