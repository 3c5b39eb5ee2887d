use thiserror::Error;

/// Any failure reported by a buffer, view or cast operation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Frozen(#[from] FrozenError),
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
}

/// An offset, length or capacity falls outside the bounds of a buffer or view.
///
/// Never clamped: the operation that detects it does nothing and returns this.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    #[error("view at offset {offset} with capacity {capacity} exceeds buffer capacity {allocated}")]
    ExceedsBuffer {
        offset: usize,
        capacity: usize,
        allocated: usize,
    },
    #[error("length {len} exceeds capacity {capacity}")]
    LengthExceedsCapacity { len: usize, capacity: usize },
    #[error("index {index} out of range for length {len}")]
    Index { index: usize, len: usize },
    #[error("range {start}..{end} out of range for length {len}")]
    Span { start: usize, end: usize, len: usize },
    #[error("view of length {len} does not fit an array of length {expected}")]
    LengthMismatch { len: usize, expected: usize },
    #[error("bounds [{low}:{high}:{max}] out of range for capacity {capacity}")]
    Bounds {
        low: usize,
        high: usize,
        max: usize,
        capacity: usize,
    },
}

/// A mutable operation was attempted on a frozen buffer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("buffer is frozen")]
pub struct FrozenError;

/// A reinterpretation cast whose size or alignment precondition does not hold.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("element size {from} does not match target size {to}")]
    SizeMismatch { from: usize, to: usize },
    #[error("address {address:#x} is not aligned to {align}")]
    Misaligned { address: usize, align: usize },
}

impl RangeError {
    pub(crate) fn bounds(low: usize, high: usize, max: usize, capacity: usize) -> Self {
        RangeError::Bounds {
            low,
            high,
            max,
            capacity,
        }
    }
}
