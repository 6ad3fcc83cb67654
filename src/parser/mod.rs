//! Trace loading and the event model.
//!
//! This module handles:
//! - Decoding the profiler's Chrome trace JSON
//! - Host operator and device kernel interval types
//! - The flattened output row schema

pub mod schema;
pub mod trace_event;

// Re-export main types
pub use schema::{DeviceKernelInterval, Dominance, HostOperatorInterval, OperatorRow};
pub use trace_event::{
    format_timestamp, load_trace, parse_trace_events, read_trace, Timestamp, TraceEvent,
    TICKS_PER_UNIT,
};
