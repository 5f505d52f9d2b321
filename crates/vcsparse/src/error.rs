//! Unified error types for value-compressed sparse matrix storage
//!
//! This module provides a centralized error handling system for all storage
//! levels and operations in vcsparse.
//!
//! # Design
//!
//! - **`SparseError`**: Top-level enum covering all error cases
//! - **`ShapeError`**: malformed dimensions, pointers or indices on
//!   construction, append and multiply
//! - **`FormatError`**: inconsistent file headers or payloads
//! - **`EncodingError`**: values that do not fit their serialized field
//!
//! Allocation failure is not represented here: payload allocation going
//! through the global allocator aborts the process, matching the storage
//! engine's fatal-OOM policy.
//!
//! # Examples
//!
//! ```
//! use vcsparse::error::{ShapeError, SparseError};
//!
//! fn validate_dims(rows: usize, cols: usize) -> Result<(), SparseError> {
//!     if rows == 0 || cols == 0 {
//!         return Err(SparseError::Shape(ShapeError::ZeroDimension));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_dims(3, 0).is_err());
//! ```

use thiserror::Error;

/// Top-level error type for all sparse storage operations
#[derive(Error, Debug)]
pub enum SparseError {
    /// Dimension, pointer or index errors on construction and operations
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),

    /// File header or payload inconsistencies
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Serialized field too narrow for a value
    #[error("encoding overflow: {0}")]
    Encoding(#[from] EncodingError),

    /// Underlying I/O failure on read/write
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structural errors in construction inputs and operation arguments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("matrix dimensions must be non-zero")]
    ZeroDimension,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("index {index} out of bounds for dimension {bound}")]
    IndexOutOfBounds { index: usize, bound: usize },

    #[error("length mismatch: {indices} indices but {values} values")]
    LengthMismatch { indices: usize, values: usize },

    #[error("outer pointer length {len} (expected {expected})")]
    OuterPtrLength { len: usize, expected: usize },

    #[error("outer pointer not monotone at slice {slice}: {start} > {end}")]
    OuterPtrNotMonotone {
        slice: usize,
        start: usize,
        end: usize,
    },

    #[error("outer pointer must span 0..{nnz}, found endpoints {first} and {last}")]
    OuterPtrEndpoints {
        first: usize,
        last: usize,
        nnz: usize,
    },

    #[error("inner indices of slice {slice} not strictly ascending at position {position}")]
    UnsortedIndices { slice: usize, position: usize },
}

/// Inconsistencies in the binary file format
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("compression level {got} does not match expected level {expected}")]
    CompressionLevel { expected: u32, got: u32 },

    #[error("unknown value type tag {tag:#x}")]
    UnknownValueTag { tag: u32 },

    #[error("value type tag {got:#x} does not match expected tag {expected:#x}")]
    ValueKindMismatch { expected: u32, got: u32 },

    #[error("header index width {got} is not one of 1, 2, 4, 8")]
    IndexWidth { got: u32 },

    #[error("run index width {got} in slice {slice} is not one of 1, 2, 4, 8")]
    RunWidth { slice: usize, got: u8 },

    #[error("header dimensions are zero")]
    ZeroHeaderDimension,

    #[error("truncated payload while reading {context}")]
    Truncated { context: &'static str },

    #[error("slice {slice} reports {size} bytes, past the end of the payload")]
    SliceOverrun { slice: usize, size: u64 },

    #[error("payload index {index} in slice {slice} out of bounds for dimension {bound}")]
    PayloadIndex {
        slice: usize,
        index: usize,
        bound: usize,
    },

    #[error("payload indices of slice {slice} not strictly ascending")]
    PayloadUnsorted { slice: usize },

    #[error("slice {slice} repeats a value key")]
    DuplicateValue { slice: usize },

    #[error("slice {slice} holds a value run with no indices")]
    EmptyRun { slice: usize },

    #[error("header reports {header} non-zeros but payload holds {payload}")]
    NnzMismatch { header: usize, payload: usize },

    #[error("malformed payload: {0}")]
    BadPayload(#[from] ShapeError),
}

/// Values that do not fit their serialized representation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("dimension {dim} does not fit the 32-bit header field")]
    HeaderOverflow { dim: usize },
}

/// Result type alias for sparse storage operations
pub type SparseResult<T> = Result<T, SparseError>;
