use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Axis {axis} is out of range for a {ndim}-dimensional grid")]
    AxisOutOfRange { axis: usize, ndim: usize },

    #[error("Index {index} is out of range for axis {axis} of size {bound}")]
    IndexOutOfRange {
        axis: usize,
        index: usize,
        bound: usize,
    },

    #[error("Buffer of length {actual} does not match grid size {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Grid shapes differ: expected {expected:?}, found {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Failed to allocate {requested_bytes} bytes: {reason}")]
    AllocationFailure {
        requested_bytes: usize,
        reason: String,
    },

    #[error("Grid has no device mirror; call `to_device` first")]
    DeviceMirrorMissing,
}
