//! Host operator extraction.
//!
//! The profiler records operators at several nesting levels (a wrapper op
//! and the op it dispatches to often share the same boundaries). A single
//! scan keeps only the outermost interval of each nest, attributes kernel
//! launches to the intervals accepted so far, and picks up the epoch marker.

use super::correlation::{attribute_launch, is_kernel_launch};
use crate::parser::{format_timestamp, Dominance, HostOperatorInterval, Timestamp, TraceEvent};
use crate::utils::config::{
    CORRELATION_KEY, EPOCH_MARKER_NAME, HOST_OPERATOR_CATEGORIES, INPUT_DIMS_KEY,
};
use crate::utils::error::SchemaError;
use log::{debug, warn};

/// Accepted host intervals, in discovery order
///
/// Owned by the extraction scan and handed back as the finalized set.
#[derive(Debug, Default)]
pub struct OperatorSet {
    intervals: Vec<HostOperatorInterval>,
}

impl OperatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `candidate`, then drop every interval it dominates or that
    /// dominates it (possibly the candidate itself)
    ///
    /// Returns true if the candidate survived.
    pub fn insert(&mut self, candidate: HostOperatorInterval) -> bool {
        let mut candidate_dominated = false;
        let mut dominated = Vec::with_capacity(self.intervals.len());

        for existing in &self.intervals {
            match candidate.dominance_against(existing) {
                Dominance::Candidate => {
                    candidate_dominated = true;
                    dominated.push(false);
                }
                Dominance::Existing => dominated.push(true),
                Dominance::Neither => dominated.push(false),
            }
        }

        let mut flags = dominated.into_iter();
        self.intervals.retain(|_| !flags.next().unwrap_or(false));

        if candidate_dominated {
            debug!(
                "Dropping operator '{}' [{}, {})",
                candidate.name,
                format_timestamp(candidate.start),
                format_timestamp(candidate.end)
            );
            false
        } else {
            self.intervals.push(candidate);
            true
        }
    }

    pub fn intervals(&self) -> &[HostOperatorInterval] {
        &self.intervals
    }

    pub fn intervals_mut(&mut self) -> &mut [HostOperatorInterval] {
        &mut self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn into_intervals(self) -> Vec<HostOperatorInterval> {
        self.intervals
    }
}

/// Result of the extraction scan
#[derive(Debug)]
pub struct OperatorScan {
    /// Surviving host intervals, with correlation ids attached
    pub operators: Vec<HostOperatorInterval>,

    /// Timestamp of the profiler epoch marker, if one was seen
    pub epoch: Option<Timestamp>,

    /// Number of launch events attributed to at least one interval
    pub attributed_launches: usize,
}

impl OperatorScan {
    /// Epoch used to re-base output timestamps (0 if the marker is absent)
    pub fn epoch_or_zero(&self) -> Timestamp {
        self.epoch.unwrap_or(0)
    }
}

/// True for complete events in one of the host operator categories
pub fn is_host_operator(event: &TraceEvent) -> bool {
    event.has_category(HOST_OPERATOR_CATEGORIES) && event.is_complete()
}

/// Build a host interval from a qualifying event
///
/// # Errors
/// * `SchemaError::MissingArgument` - no `ts`/`dur` or no `Input Dims`
/// * `SchemaError::InvalidValue` - `Input Dims` is not a list
pub fn host_interval_from_event(
    event: &TraceEvent,
) -> Result<HostOperatorInterval, SchemaError> {
    let (start, end) = event.interval()?;
    let input_dims = event
        .arg(INPUT_DIMS_KEY)?
        .as_array()
        .cloned()
        .ok_or_else(|| SchemaError::invalid(&event.name, INPUT_DIMS_KEY, "expected a list"))?;

    Ok(HostOperatorInterval::new(event.name.clone(), start, end, input_dims))
}

/// Scan the event list once, extracting host intervals, attributing kernel
/// launches and recording the epoch marker
///
/// **Public** - first pass of the pipeline
///
/// Launches are attributed only to intervals accepted before the launch
/// event appears; ids gathered by an interval that is later dominated are
/// dropped with it.
pub fn extract_operators(events: &[TraceEvent]) -> Result<OperatorScan, SchemaError> {
    let mut set = OperatorSet::new();
    let mut epoch = None;
    let mut attributed_launches = 0;

    for event in events {
        if is_host_operator(event) {
            set.insert(host_interval_from_event(event)?);
        } else if is_kernel_launch(event) {
            let (start, end) = event.interval()?;
            let correlation_id = event.correlation_id(CORRELATION_KEY)?;
            if attribute_launch(set.intervals_mut(), correlation_id, start, end) > 0 {
                attributed_launches += 1;
            }
        } else if event.name == EPOCH_MARKER_NAME {
            if epoch.is_some() {
                debug!("Epoch marker seen again, keeping the latest");
            }
            epoch = Some(event.start()?);
        }
    }

    if epoch.is_none() {
        warn!("No '{}' marker found, timestamps are not re-based", EPOCH_MARKER_NAME);
    }

    debug!(
        "{} operators survived, {} launches attributed",
        set.len(),
        attributed_launches
    );

    Ok(OperatorScan {
        operators: set.into_intervals(),
        epoch,
        attributed_launches,
    })
}
