//! Comma-separated table writer.
//!
//! Structured fields (shape lists, grid/block dims) are written as compact
//! JSON with their commas replaced by semicolons, so every row has a fixed
//! column count. Times are written in trace clock units.

use crate::parser::{format_timestamp, OperatorRow};
use crate::utils::config::{EXTENDED_HEADER, STANDARD_HEADER};
use crate::utils::error::OutputError;
use log::{debug, info};
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Which set of columns to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnLayout {
    /// The 15-column table
    #[default]
    Standard,
    /// Adds operator timing, correlation ids, conv shapes and kernel times
    Extended,
}

impl ColumnLayout {
    pub fn header(&self) -> &'static str {
        match self {
            ColumnLayout::Standard => STANDARD_HEADER,
            ColumnLayout::Extended => EXTENDED_HEADER,
        }
    }
}

/// Replace embedded commas so a field stays in one column
pub fn sanitize(field: &str) -> String {
    field.replace(',', ";")
}

fn structured(value: &Value) -> String {
    sanitize(&value.to_string())
}

fn list(values: &[Value]) -> String {
    let joined: Vec<String> = values.iter().map(Value::to_string).collect();
    format!("[{}]", joined.join(";"))
}

fn id_list(ids: &[u64]) -> String {
    let joined: Vec<String> = ids.iter().map(u64::to_string).collect();
    format!("[{}]", joined.join(";"))
}

/// Render one data line (without trailing newline)
pub fn render_row(row: &OperatorRow, layout: ColumnLayout) -> String {
    let blocks_per_sm = row
        .blocks_per_sm
        .as_ref()
        .map(structured)
        .unwrap_or_default();

    let fields: Vec<String> = match layout {
        ColumnLayout::Standard => vec![
            row.model_id.clone(),
            row.layer_id.to_string(),
            sanitize(&row.operator_name),
            format_timestamp(row.cuda_time),
            format_timestamp(row.cuda_time_no_overlap),
            sanitize(&list(&row.input_dims)),
            row.input_products.to_string(),
            structured(&row.input_size),
            format_timestamp(row.kernel_duration),
            blocks_per_sm,
            structured(&row.warps_per_sm),
            structured(&row.stream),
            structured(&row.grid),
            structured(&row.block),
            sanitize(&row.kernel_name),
        ],
        ColumnLayout::Extended => vec![
            row.model_id.clone(),
            row.layer_id.to_string(),
            sanitize(&row.operator_name),
            format_timestamp(row.cuda_time),
            format_timestamp(row.cuda_time_no_overlap),
            format_timestamp(row.operator_duration),
            format_timestamp(row.operator_start),
            format_timestamp(row.operator_end),
            id_list(&row.operator_correlation_ids),
            sanitize(&list(&row.input_dims)),
            row.input_products.to_string(),
            structured(&row.input_size),
            structured(&row.conv_kernel_size),
            structured(&row.bias),
            format_timestamp(row.kernel_duration),
            format_timestamp(row.kernel_start),
            format_timestamp(row.kernel_end),
            row.kernel_correlation_id.to_string(),
            blocks_per_sm,
            structured(&row.warps_per_sm),
            structured(&row.stream),
            structured(&row.grid),
            structured(&row.block),
            sanitize(&row.kernel_name),
        ],
    };

    fields.join(",")
}

/// Write the header and one line per row
pub fn write_table<W: Write>(
    writer: &mut W,
    rows: &[OperatorRow],
    layout: ColumnLayout,
) -> Result<(), OutputError> {
    writeln!(writer, "{}", layout.header())?;
    for row in rows {
        writeln!(writer, "{}", render_row(row, layout))?;
    }
    writer.flush()?;

    debug!("Wrote {} rows", rows.len());
    Ok(())
}

/// Write the table to a file, creating parent directories as needed
///
/// # Errors
/// * `OutputError::InvalidPath` - empty path, directory, or parent cannot be created
/// * `OutputError::WriteFailed` - I/O error during write
pub fn write_table_to_path(
    rows: &[OperatorRow],
    layout: ColumnLayout,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing table to: {}", output_path.display());

    super::validate_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    write_table(&mut writer, rows, layout)
}
