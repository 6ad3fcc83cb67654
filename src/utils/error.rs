//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while loading a trace document
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed trace: {0}")]
    MalformedInput(String),
}

/// Errors raised when a qualifying event does not have the shape the
/// profiler is expected to produce
#[derive(Error, Debug, PartialEq)]
pub enum SchemaError {
    #[error("Event '{event}' is missing required field '{key}'")]
    MissingArgument { event: String, key: String },

    #[error("Event '{event}' has an invalid value for '{key}': {reason}")]
    InvalidValue {
        event: String,
        key: String,
        reason: String,
    },
}

impl SchemaError {
    pub fn missing(event: &str, key: &str) -> Self {
        Self::MissingArgument {
            event: event.to_string(),
            key: key.to_string(),
        }
    }

    pub fn invalid(event: &str, key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            event: event.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during table output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
