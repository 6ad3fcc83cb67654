//! Fixed profiler vocabulary.
//!
//! The PyTorch profiler (Kineto) writes Chrome trace JSON. These are the
//! category, phase, name and argument keys this tool keys off.

// Event categories, compared lowercase
pub const HOST_OPERATOR_CATEGORIES: &[&str] = &["cpu_op", "operator"];
pub const RUNTIME_CATEGORIES: &[&str] = &["cuda_runtime", "runtime"];
pub const KERNEL_CATEGORY: &str = "kernel";

/// Phase marker of a complete ("X") duration event, compared lowercase
pub const COMPLETE_PHASE: &str = "x";

/// Runtime call that launches a device kernel, compared lowercase
pub const LAUNCH_FUNCTION: &str = "cudalaunchkernel";

/// Name of the marker event whose timestamp is profiling time zero
pub const EPOCH_MARKER_NAME: &str = "Iteration Start: PyTorch Profiler";

/// Top-level field holding the event array
pub const TRACE_EVENTS_FIELD: &str = "traceEvents";

// Argument keys
pub const INPUT_DIMS_KEY: &str = "Input Dims";
pub const CORRELATION_KEY: &str = "correlation";
pub const REGISTERS_PER_THREAD_KEY: &str = "registers per thread";
pub const SHARED_MEMORY_KEY: &str = "shared memory";
pub const WARPS_PER_SM_KEY: &str = "warps per SM";
pub const GRID_KEY: &str = "grid";
pub const BLOCK_KEY: &str = "block";
pub const STREAM_KEY: &str = "stream";

/// Operator whose weight shape and bias are broken out separately
pub const CONV2D_OPERATOR: &str = "aten::conv2d";

pub const STANDARD_HEADER: &str = "modelid,layerid,cpueventname,cudatime,cudatimenooverlap,\
inputdims,inputproducts,inputsize,kernelduration,blocksperSM,warpsperSM,stream,grid,block,\
kernelname";

pub const EXTENDED_HEADER: &str = "modelid,layerid,cpueventname,cudatime,cudatimenooverlap,\
cpueventduration,cpueventstarttime,cpueventendtime,cpucorrelationid,inputdims,inputproducts,\
inputsize,convkernelsize,bias,kernelduration,kernelstarttime,kernelendtime,correlationid,\
blocksperSM,warpsperSM,stream,grid,block,kernelname";
