//! Output writers for correlated operator rows.
//!
//! Rows go to stdout by default or to a file when requested.

pub mod csv;

// Re-export main functions
pub use csv::{render_row, write_table, write_table_to_path, ColumnLayout};

use crate::utils::error::OutputError;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}
