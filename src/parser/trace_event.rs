//! Trace loader for PyTorch profiler output.
//!
//! Decodes a Chrome trace document into an ordered list of raw events.
//! Only the top-level structure is validated here; per-event fields are
//! checked lazily by the phase that needs them.

use crate::utils::config::{COMPLETE_PHASE, TRACE_EVENTS_FIELD};
use crate::utils::error::{ParseError, SchemaError};
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Time in ticks: thousandths of the trace clock unit (ns for Kineto's us)
///
/// Kineto writes fractional microseconds, so timestamps are scaled to an
/// exact integer sub-unit on load and only scaled back when rendered.
pub type Timestamp = i64;

/// Ticks per trace clock unit
pub const TICKS_PER_UNIT: Timestamp = 1000;

/// Raw event from the `traceEvents` array
///
/// Every field is optional at this level. Kineto traces mix metadata,
/// instant, flow and complete events, and only a few of them matter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraceEvent {
    /// Event category (`cpu_op`, `cuda_runtime`, `kernel`, ...)
    #[serde(default)]
    pub cat: String,

    /// Phase marker (`X` for complete events)
    #[serde(default)]
    pub ph: String,

    /// Event name
    #[serde(default)]
    pub name: String,

    /// Start timestamp
    #[serde(default)]
    pub ts: Option<Value>,

    /// Duration
    #[serde(default)]
    pub dur: Option<Value>,

    /// Category-specific arguments
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl TraceEvent {
    /// Case-insensitive category match against any of `categories`
    pub fn has_category(&self, categories: &[&str]) -> bool {
        categories
            .iter()
            .any(|cat| self.cat.eq_ignore_ascii_case(cat))
    }

    /// True for complete (`X`) duration events
    pub fn is_complete(&self) -> bool {
        self.ph.eq_ignore_ascii_case(COMPLETE_PHASE)
    }

    /// Start timestamp of the event
    pub fn start(&self) -> Result<Timestamp, SchemaError> {
        let ts = self
            .ts
            .as_ref()
            .ok_or_else(|| SchemaError::missing(&self.name, "ts"))?;
        as_timestamp(ts).ok_or_else(|| SchemaError::invalid(&self.name, "ts", "not a number"))
    }

    /// `(start, end)` of a complete event, end being `ts + dur`
    pub fn interval(&self) -> Result<(Timestamp, Timestamp), SchemaError> {
        let start = self.start()?;
        let dur = self
            .dur
            .as_ref()
            .ok_or_else(|| SchemaError::missing(&self.name, "dur"))?;
        let dur = as_timestamp(dur)
            .ok_or_else(|| SchemaError::invalid(&self.name, "dur", "not a number"))?;
        Ok((start, start.saturating_add(dur)))
    }

    /// Required argument lookup
    pub fn arg(&self, key: &str) -> Result<&Value, SchemaError> {
        self.args
            .get(key)
            .ok_or_else(|| SchemaError::missing(&self.name, &format!("args.{}", key)))
    }

    /// The `correlation` argument linking launches to kernels
    pub fn correlation_id(&self, key: &str) -> Result<u64, SchemaError> {
        self.arg(key)?.as_u64().ok_or_else(|| {
            SchemaError::invalid(&self.name, key, "expected a non-negative integer")
        })
    }
}

/// Read and decode a trace file
///
/// **Public** - entry point used by the analyze command
pub fn read_trace(path: impl AsRef<Path>) -> Result<Vec<TraceEvent>, ParseError> {
    let path = path.as_ref();
    debug!("Reading trace from: {}", path.display());

    let bytes = std::fs::read(path)?;
    load_trace(&bytes)
}

/// Decode raw trace bytes into events, preserving document order
///
/// # Errors
/// * `ParseError::Json` - bytes are not valid JSON
/// * `ParseError::MalformedInput` - no `traceEvents` array, or an entry
///   of it is not an object
pub fn load_trace(bytes: &[u8]) -> Result<Vec<TraceEvent>, ParseError> {
    let raw: Value = serde_json::from_slice(bytes)?;
    parse_trace_events(raw)
}

/// Extract the event list from an already decoded document
pub fn parse_trace_events(raw: Value) -> Result<Vec<TraceEvent>, ParseError> {
    let Value::Object(mut root) = raw else {
        return Err(ParseError::MalformedInput(
            "Trace must be a JSON object".to_string(),
        ));
    };

    let entries = match root.remove(TRACE_EVENTS_FIELD) {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(ParseError::MalformedInput(format!(
                "'{}' is not an array",
                TRACE_EVENTS_FIELD
            )))
        }
        None => {
            return Err(ParseError::MalformedInput(format!(
                "Missing '{}' field",
                TRACE_EVENTS_FIELD
            )))
        }
    };

    let mut events = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        if !entry.is_object() {
            return Err(ParseError::MalformedInput(format!(
                "Event {} is not an object",
                index
            )));
        }
        let event = serde_json::from_value::<TraceEvent>(entry).map_err(|e| {
            ParseError::MalformedInput(format!("Event {} could not be decoded: {}", index, e))
        })?;
        events.push(event);
    }

    debug!("Loaded {} trace events", events.len());
    Ok(events)
}

/// Convert a trace clock value to ticks
fn as_timestamp(value: &Value) -> Option<Timestamp> {
    if let Some(units) = value.as_i64() {
        return units.checked_mul(TICKS_PER_UNIT);
    }
    let units = value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))?;
    let ticks = (units * TICKS_PER_UNIT as f64).round();
    ticks.is_finite().then_some(ticks as Timestamp)
}

/// Render ticks in trace clock units, e.g. `3`, `0.4`, `-12.05`
pub fn format_timestamp(ticks: Timestamp) -> String {
    let sign = if ticks < 0 { "-" } else { "" };
    let abs = ticks.unsigned_abs();
    let per_unit = TICKS_PER_UNIT as u64;
    let (whole, frac) = (abs / per_unit, abs % per_unit);

    if frac == 0 {
        format!("{}{}", sign, whole)
    } else {
        let digits = format!("{:03}", frac);
        format!("{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}
