//! # vcsparse
//!
//! Value-compressed sparse matrix storage for matrices whose non-zero
//! entries draw from a small vocabulary of repeated values.
//!
//! This crate provides:
//! - **VCSC** (level 2): per-slice grouping of indices by unique value —
//!   construction-friendly, random access kept
//! - **IVCSC** (level 3): packed positive-delta runs with a per-run byte
//!   width — maximally compact, iterator access
//! - **Baseline CSC** (level 1): the classical three-array format used for
//!   ingestion and export
//! - **Construction** from CSC arrays, coordinate triplets, dense vectors
//!   and arrays, and files
//! - **Operations:** a uniform slice-cursor protocol, transpose, in-place
//!   scalar multiply, SpMV/SpMM against dense operands, element access
//! - **A binary file format** shared by all three levels
//! - **Redundancy analysis** for choosing a storage level
//!
//! # Examples
//!
//! ```
//! use vcsparse::{Orientation, SparseMatrix, VcscMatrix};
//!
//! // A column that repeats the value 5.
//! let triplets = [(0, 0, 5.0), (2, 0, 5.0), (3, 0, 5.0), (4, 0, 9.0)];
//! let m = VcscMatrix::from_coo(&triplets, 6, 1, Orientation::ColumnMajor).unwrap();
//!
//! assert_eq!(m.nnz(), 4);
//! assert_eq!(m.unique_count(0), Some(2));
//! assert_eq!(m.sum(), 24.0);
//!
//! // Pack into the compact level and keep iterating the same entries.
//! let packed = m.to_ivcsc();
//! assert_eq!(packed.to_triplets(), m.to_triplets());
//!
//! // Transpose builds a fresh matrix with values preserved.
//! let t = m.transpose();
//! assert_eq!(t.sum(), m.sum());
//! ```
//!
//! # SciRS2 Integration
//!
//! Dense operands and results use `scirs2_core::ndarray_ext` types. Direct
//! use of `ndarray` is forbidden.

#![deny(warnings)]

pub mod codec;
pub mod csc;
pub mod error;
pub mod io;
pub mod iterators;
pub mod ivcsc;
pub mod matrix;
pub mod utils;
pub mod value;
pub mod vcsc;

// Re-exports
pub use csc::CscMatrix;
pub use error::{EncodingError, FormatError, ShapeError, SparseError, SparseResult};
pub use iterators::{NonZeroIterator, SliceEntry};
pub use ivcsc::IvcscMatrix;
pub use matrix::{Orientation, SparseMatrix};
pub use value::{SparseValue, ValueClass, ValueKind};
pub use vcsc::{ValueGroup, VcscMatrix};
