//! Per-operator device time metrics and row flattening.
//!
//! Every operator with kernels attached becomes one row per kernel, with
//! the operator-level aggregates repeated on each row.

use crate::parser::{HostOperatorInterval, OperatorRow, Timestamp};
use crate::utils::config::{CONV2D_OPERATOR, INPUT_DIMS_KEY};
use crate::utils::error::SchemaError;
use log::debug;
use serde_json::Value;

/// Aggregates computed once per host operator
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorMetrics {
    /// Span from the earliest kernel start to the latest kernel end
    pub cuda_time: Timestamp,

    /// Sum of kernel durations; concurrent kernels are counted twice
    pub cuda_time_no_overlap: Timestamp,

    /// Product of the first input shape's dimensions
    pub input_products: i64,

    /// First input shape, verbatim (`[]` if the operator has no inputs)
    pub input_size: Value,

    /// Spatial weight dims for `aten::conv2d`, otherwise `0`
    pub conv_kernel_size: Value,

    /// Bias shape for `aten::conv2d`, otherwise `0`
    pub bias: Value,
}

/// Product of every integer in a shape descriptor (nested lists flattened)
///
/// An empty descriptor has product 1.
pub fn shape_product(shape: &Value) -> i64 {
    match shape {
        Value::Array(dims) => dims
            .iter()
            .fold(1i64, |acc, dim| acc.saturating_mul(shape_product(dim))),
        Value::Number(n) => n.as_i64().unwrap_or(1),
        _ => 1,
    }
}

/// `(cuda_time, cuda_time_no_overlap)` for an operator's kernels
///
/// Kernel times are re-based to `epoch` before taking the span, which
/// leaves the difference unchanged.
pub fn device_time(
    operator: &HostOperatorInterval,
    epoch: Timestamp,
) -> (Timestamp, Timestamp) {
    let Some(first_start) = operator.kernels.iter().map(|k| k.start - epoch).min() else {
        return (0, 0);
    };
    let last_end = operator
        .kernels
        .iter()
        .map(|k| k.end - epoch)
        .max()
        .unwrap_or(first_start);

    let busy: Timestamp = operator.kernels.iter().map(|k| k.duration()).sum();
    (last_end - first_start, busy)
}

/// Compute all per-operator aggregates
///
/// # Errors
/// * `SchemaError::MissingArgument` - an `aten::conv2d` operator without
///   weight or bias shape descriptors
pub fn summarize(
    operator: &HostOperatorInterval,
    epoch: Timestamp,
) -> Result<OperatorMetrics, SchemaError> {
    let input_size = operator
        .input_dims
        .first()
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    let input_products = shape_product(&input_size);

    let (conv_kernel_size, bias) = if operator.name == CONV2D_OPERATOR {
        conv2d_shapes(operator)?
    } else {
        (Value::from(0), Value::from(0))
    };

    let (cuda_time, cuda_time_no_overlap) = device_time(operator, epoch);

    Ok(OperatorMetrics {
        cuda_time,
        cuda_time_no_overlap,
        input_products,
        input_size,
        conv_kernel_size,
        bias,
    })
}

/// Weight spatial dims (`weight[2..]`) and bias shape of a 2D convolution
fn conv2d_shapes(operator: &HostOperatorInterval) -> Result<(Value, Value), SchemaError> {
    let weight = operator
        .input_dims
        .get(1)
        .ok_or_else(|| SchemaError::missing(&operator.name, &format!("{}[1]", INPUT_DIMS_KEY)))?;
    let bias = operator
        .input_dims
        .get(2)
        .ok_or_else(|| SchemaError::missing(&operator.name, &format!("{}[2]", INPUT_DIMS_KEY)))?;

    let spatial = weight
        .as_array()
        .map(|dims| dims.iter().skip(2).cloned().collect())
        .unwrap_or_default();

    Ok((Value::Array(spatial), bias.clone()))
}

/// Flatten operators into output rows
///
/// **Public** - final pass of the pipeline
///
/// `layer_id` counts every operator, including those that emit no rows.
pub fn build_rows(
    model_id: &str,
    operators: &[HostOperatorInterval],
    epoch: Timestamp,
) -> Result<Vec<OperatorRow>, SchemaError> {
    let mut rows = Vec::new();

    for (position, operator) in operators.iter().enumerate() {
        if operator.kernels.is_empty() {
            continue;
        }
        let metrics = summarize(operator, epoch)?;

        for kernel in &operator.kernels {
            rows.push(OperatorRow {
                model_id: model_id.to_string(),
                layer_id: position + 1,
                operator_name: operator.name.clone(),
                cuda_time: metrics.cuda_time,
                cuda_time_no_overlap: metrics.cuda_time_no_overlap,
                operator_duration: operator.duration(),
                operator_start: operator.start - epoch,
                operator_end: operator.end - epoch,
                operator_correlation_ids: operator.correlation_ids.clone(),
                input_dims: operator.input_dims.clone(),
                input_products: metrics.input_products,
                input_size: metrics.input_size.clone(),
                conv_kernel_size: metrics.conv_kernel_size.clone(),
                bias: metrics.bias.clone(),
                kernel_duration: kernel.duration(),
                kernel_start: kernel.start - epoch,
                kernel_end: kernel.end - epoch,
                kernel_correlation_id: kernel.correlation_id,
                blocks_per_sm: kernel.blocks_per_sm.clone(),
                warps_per_sm: kernel.warps_per_sm.clone(),
                stream: kernel.stream.clone(),
                grid: kernel.grid.clone(),
                block: kernel.block.clone(),
                kernel_name: kernel.name.clone(),
            });
        }
    }

    debug!("Built {} rows from {} operators", rows.len(), operators.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DeviceKernelInterval;
    use serde_json::json;

    fn kernel(start: Timestamp, end: Timestamp) -> DeviceKernelInterval {
        DeviceKernelInterval {
            name: "k".to_string(),
            start,
            end,
            correlation_id: 1,
            registers_per_thread: json!(32),
            shared_memory: json!(0),
            warps_per_sm: json!(4.0),
            grid: json!([1, 1, 1]),
            block: json!([32, 1, 1]),
            stream: json!(7),
            blocks_per_sm: None,
        }
    }

    #[test]
    fn test_shape_product() {
        assert_eq!(shape_product(&json!([1, 3, 224, 224])), 150528);
        assert_eq!(shape_product(&json!([])), 1);
        assert_eq!(shape_product(&json!([[2, 3], [4]])), 24);
    }

    #[test]
    fn test_device_time_overlapping_kernels() {
        let mut op = HostOperatorInterval::new("op", 0, 1000, vec![json!([2])]);
        op.kernels = vec![kernel(100, 150), kernel(120, 200), kernel(300, 310)];

        let (span, busy) = device_time(&op, 50);
        assert_eq!(span, 210);
        assert_eq!(busy, 50 + 80 + 10);
    }

    #[test]
    fn test_device_time_kernel_at_epoch() {
        let mut op = HostOperatorInterval::new("op", 0, 1000, Vec::new());
        op.kernels = vec![kernel(500, 510), kernel(520, 540)];

        assert_eq!(device_time(&op, 500), (40, 30));
    }

    #[test]
    fn test_device_time_without_kernels() {
        let op = HostOperatorInterval::new("op", 0, 1000, Vec::new());
        assert_eq!(device_time(&op, 0), (0, 0));
    }

    #[test]
    fn test_conv2d_shapes() {
        let op = HostOperatorInterval::new(
            "aten::conv2d",
            0,
            10,
            vec![json!([1, 3, 224, 224]), json!([64, 3, 7, 7]), json!([64]), json!([])],
        );

        let metrics = summarize(&op, 0).unwrap();
        assert_eq!(metrics.conv_kernel_size, json!([7, 7]));
        assert_eq!(metrics.bias, json!([64]));
    }

    #[test]
    fn test_non_conv_shapes_are_zero() {
        let op = HostOperatorInterval::new(
            "aten::convolution",
            0,
            10,
            vec![json!([1, 3, 224, 224]), json!([64, 3, 7, 7]), json!([64])],
        );

        let metrics = summarize(&op, 0).unwrap();
        assert_eq!(metrics.conv_kernel_size, json!(0));
        assert_eq!(metrics.bias, json!(0));
        assert_eq!(metrics.input_size, json!([1, 3, 224, 224]));
    }

    #[test]
    fn test_conv2d_without_bias_shape_is_schema_error() {
        let op = HostOperatorInterval::new("aten::conv2d", 0, 10, vec![json!([1, 3, 8, 8])]);
        assert!(summarize(&op, 0).is_err());
    }

    #[test]
    fn test_operator_without_inputs() {
        let op = HostOperatorInterval::new("aten::empty", 0, 10, Vec::new());
        let metrics = summarize(&op, 0).unwrap();
        assert_eq!(metrics.input_products, 1);
        assert_eq!(metrics.input_size, json!([]));
    }

    #[test]
    fn test_layer_ids_count_empty_operators() {
        let empty = HostOperatorInterval::new("aten::view", 0, 5, vec![json!([4])]);
        let mut busy = HostOperatorInterval::new("aten::mm", 10, 50, vec![json!([4, 4])]);
        busy.kernels = vec![kernel(20, 25), kernel(30, 32)];

        let rows = build_rows("trace.json", &[empty, busy], 0).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.layer_id == 2));
        assert!(rows.iter().all(|r| r.cuda_time == 12 && r.cuda_time_no_overlap == 7));
        assert_eq!(rows[1].kernel_duration, 2);
    }
}
