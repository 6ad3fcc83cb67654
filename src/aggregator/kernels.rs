//! Binding of device kernel executions to host operators.

use super::correlation::CorrelationIndex;
use crate::parser::{DeviceKernelInterval, HostOperatorInterval, TraceEvent};
use crate::utils::config::{
    BLOCK_KEY, CORRELATION_KEY, GRID_KEY, KERNEL_CATEGORY, REGISTERS_PER_THREAD_KEY,
    SHARED_MEMORY_KEY, STREAM_KEY, WARPS_PER_SM_KEY,
};
use crate::utils::error::SchemaError;
use log::debug;

/// True for complete device kernel events
pub fn is_kernel_execution(event: &TraceEvent) -> bool {
    event.has_category(&[KERNEL_CATEGORY]) && event.is_complete()
}

/// Build a kernel interval from a qualifying event
///
/// # Errors
/// * `SchemaError::MissingArgument` - timing, correlation id or any launch
///   metadata key is absent
pub fn kernel_interval_from_event(
    event: &TraceEvent,
) -> Result<DeviceKernelInterval, SchemaError> {
    let correlation_id = event.correlation_id(CORRELATION_KEY)?;
    let (start, end) = event.interval()?;

    Ok(DeviceKernelInterval {
        name: event.name.clone(),
        start,
        end,
        correlation_id,
        registers_per_thread: event.arg(REGISTERS_PER_THREAD_KEY)?.clone(),
        shared_memory: event.arg(SHARED_MEMORY_KEY)?.clone(),
        warps_per_sm: event.arg(WARPS_PER_SM_KEY)?.clone(),
        grid: event.arg(GRID_KEY)?.clone(),
        block: event.arg(BLOCK_KEY)?.clone(),
        stream: event.arg(STREAM_KEY)?.clone(),
        blocks_per_sm: None,
    })
}

/// Second pass: attach every kernel whose correlation id is held by a host
/// interval to all such intervals
///
/// **Public** - second pass of the pipeline
///
/// Kernels with no matching interval are skipped without validating their
/// metadata. Returns the number of (interval, kernel) attachments made.
pub fn bind_kernels(
    events: &[TraceEvent],
    operators: &mut [HostOperatorInterval],
    index: &CorrelationIndex,
) -> Result<usize, SchemaError> {
    let mut attached = 0;
    let mut unmatched = 0;

    for event in events.iter().filter(|e| is_kernel_execution(e)) {
        let correlation_id = event.correlation_id(CORRELATION_KEY)?;
        let positions = index.lookup(correlation_id);
        if positions.is_empty() {
            unmatched += 1;
            continue;
        }

        let kernel = kernel_interval_from_event(event)?;
        for &position in positions {
            operators[position].kernels.push(kernel.clone());
            attached += 1;
        }
    }

    debug!(
        "Attached {} kernels, {} kernel events had no host operator",
        attached, unmatched
    );

    Ok(attached)
}
