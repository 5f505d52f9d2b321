//! Baseline CSC (Compressed Sparse Column) storage — compression level 1
//!
//! The classical three-array sparse format: values, inner indices, and an
//! outer pointer array of length `outer_dim + 1`. It carries no value
//! compression and serves as the ingestion and export format for the
//! value-compressed levels.
//!
//! # Format
//!
//! For a matrix with `outer_dim` slices and `nnz` non-zeros:
//! - `values`: `Vec<T>` of length nnz
//! - `inner_indices`: `Vec<usize>` of length nnz, strictly ascending within
//!   each slice
//! - `outer_ptr`: `Vec<usize>` of length outer_dim + 1, with
//!   `outer_ptr[0] = 0` and `outer_ptr[outer_dim] = nnz`
//!
//! # Examples
//!
//! ```
//! use vcsparse::{CscMatrix, Orientation, SparseMatrix};
//!
//! // [1.0  0   4.0]
//! // [0    3.0 0  ]
//! // [2.0  0   5.0]
//! let csc = CscMatrix::from_parts(
//!     vec![1.0, 2.0, 3.0, 4.0, 5.0],
//!     vec![0, 2, 1, 0, 2],
//!     vec![0, 2, 3, 5],
//!     3,
//!     3,
//!     Orientation::ColumnMajor,
//! )
//! .unwrap();
//!
//! assert_eq!(csc.nnz(), 5);
//! assert_eq!(csc.coeff(2, 2), 5.0);
//! ```

use crate::error::{ShapeError, SparseResult};
use crate::ivcsc::IvcscMatrix;
use crate::matrix::{Orientation, SparseMatrix};
use crate::value::SparseValue;
use crate::vcsc::VcscMatrix;
use scirs2_core::ndarray_ext::Array2;

/// Validate a raw CSC triple against the target dimensions
///
/// Checks the outer pointer length, endpoints and monotonicity, and that the
/// inner indices of every slice are in range and strictly ascending.
pub(crate) fn validate_parts(
    values_len: usize,
    inner_indices: &[usize],
    outer_ptr: &[usize],
    inner_dim: usize,
    outer_dim: usize,
) -> Result<(), ShapeError> {
    if inner_dim == 0 || outer_dim == 0 {
        return Err(ShapeError::ZeroDimension);
    }

    if values_len != inner_indices.len() {
        return Err(ShapeError::LengthMismatch {
            indices: inner_indices.len(),
            values: values_len,
        });
    }

    if outer_ptr.len() != outer_dim + 1 {
        return Err(ShapeError::OuterPtrLength {
            len: outer_ptr.len(),
            expected: outer_dim + 1,
        });
    }

    if outer_ptr[0] != 0 || outer_ptr[outer_dim] != values_len {
        return Err(ShapeError::OuterPtrEndpoints {
            first: outer_ptr[0],
            last: outer_ptr[outer_dim],
            nnz: values_len,
        });
    }

    for slice in 0..outer_dim {
        let start = outer_ptr[slice];
        let end = outer_ptr[slice + 1];
        if start > end {
            return Err(ShapeError::OuterPtrNotMonotone { slice, start, end });
        }

        for k in start..end {
            let index = inner_indices[k];
            if index >= inner_dim {
                return Err(ShapeError::IndexOutOfBounds {
                    index,
                    bound: inner_dim,
                });
            }
            if k > start && inner_indices[k - 1] >= index {
                return Err(ShapeError::UnsortedIndices { slice, position: k });
            }
        }
    }

    Ok(())
}

/// Baseline CSC matrix
///
/// Read-only after construction; the value-compressed levels are built from
/// it and export back to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T> {
    values: Vec<T>,
    inner_indices: Vec<usize>,
    outer_ptr: Vec<usize>,
    rows: usize,
    cols: usize,
    orientation: Orientation,
}

impl<T: SparseValue> CscMatrix<T> {
    /// Create a CSC matrix from its three raw arrays
    ///
    /// # Errors
    ///
    /// Returns a shape error if:
    /// - either dimension is zero
    /// - `values` and `inner_indices` have different lengths
    /// - `outer_ptr` does not have length outer_dim + 1, does not span
    ///   `0..nnz`, or is not monotone
    /// - any inner index is out of range or a slice's indices are not
    ///   strictly ascending
    pub fn from_parts(
        values: Vec<T>,
        inner_indices: Vec<usize>,
        outer_ptr: Vec<usize>,
        rows: usize,
        cols: usize,
        orientation: Orientation,
    ) -> SparseResult<Self> {
        let inner_dim = orientation.inner_len(rows, cols);
        let outer_dim = orientation.outer_len(rows, cols);
        validate_parts(
            values.len(),
            &inner_indices,
            &outer_ptr,
            inner_dim,
            outer_dim,
        )?;

        Ok(Self {
            values,
            inner_indices,
            outer_ptr,
            rows,
            cols,
            orientation,
        })
    }

    /// Build without re-validating; the caller guarantees the invariants
    pub(crate) fn from_parts_unchecked(
        values: Vec<T>,
        inner_indices: Vec<usize>,
        outer_ptr: Vec<usize>,
        rows: usize,
        cols: usize,
        orientation: Orientation,
    ) -> Self {
        debug_assert!(validate_parts(
            values.len(),
            &inner_indices,
            &outer_ptr,
            orientation.inner_len(rows, cols),
            orientation.outer_len(rows, cols),
        )
        .is_ok());

        Self {
            values,
            inner_indices,
            outer_ptr,
            rows,
            cols,
            orientation,
        }
    }

    /// Create an empty CSC matrix with the given shape
    pub fn zeros(rows: usize, cols: usize, orientation: Orientation) -> SparseResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(ShapeError::ZeroDimension.into());
        }

        let outer_dim = orientation.outer_len(rows, cols);
        Ok(Self {
            values: Vec::new(),
            inner_indices: Vec::new(),
            outer_ptr: vec![0; outer_dim + 1],
            rows,
            cols,
            orientation,
        })
    }

    /// Stored values
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Inner index of each stored value
    pub fn inner_indices(&self) -> &[usize] {
        &self.inner_indices
    }

    /// Outer pointer array (length outer_dim + 1)
    pub fn outer_ptr(&self) -> &[usize] {
        &self.outer_ptr
    }

    /// One outer slice as (inner_indices, values)
    pub fn slice(&self, s: usize) -> Option<(&[usize], &[T])> {
        if s >= self.outer_dim() {
            return None;
        }

        let start = self.outer_ptr[s];
        let end = self.outer_ptr[s + 1];
        Some((&self.inner_indices[start..end], &self.values[start..end]))
    }

    /// Convert to the value-grouped representation (level 2)
    pub fn to_vcsc(&self) -> VcscMatrix<T> {
        VcscMatrix::from_csc(self)
    }

    /// Convert to the packed run representation (level 3)
    pub fn to_ivcsc(&self) -> IvcscMatrix<T> {
        IvcscMatrix::from_csc(self)
    }

    /// Materialize as a dense array
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::from_elem((self.rows, self.cols), T::zero());
        for s in 0..self.outer_dim() {
            for k in self.outer_ptr[s]..self.outer_ptr[s + 1] {
                let (row, col) = self.orientation.row_col(s, self.inner_indices[k]);
                dense[[row, col]] = self.values[k];
            }
        }
        dense
    }

    /// Serialized payload size in bytes (header excluded)
    pub fn byte_size(&self) -> usize {
        let index_bytes =
            usize::from(crate::codec::byte_width(self.inner_dim().max(self.nnz()) as u64));
        self.nnz() * (T::WIDTH + index_bytes) + (self.outer_dim() + 1) * index_bytes
    }
}

impl<T: SparseValue> SparseMatrix<T> for CscMatrix<T> {
    const COMPRESSION_LEVEL: u32 = 1;

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn coeff(&self, row: usize, col: usize) -> T {
        if row >= self.rows || col >= self.cols {
            return T::zero();
        }

        let (outer, inner) = self.orientation.outer_inner(row, col);
        let start = self.outer_ptr[outer];
        let end = self.outer_ptr[outer + 1];
        match self.inner_indices[start..end].binary_search(&inner) {
            Ok(pos) => self.values[start + pos],
            Err(_) => T::zero(),
        }
    }

    fn sum(&self) -> T {
        self.values.iter().fold(T::zero(), |acc, &v| acc + v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SparseError;

    fn sample() -> CscMatrix<f64> {
        // [1 0 4]
        // [0 3 0]
        // [2 0 5]
        CscMatrix::from_parts(
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![0, 2, 1, 0, 2],
            vec![0, 2, 3, 5],
            3,
            3,
            Orientation::ColumnMajor,
        )
        .unwrap()
    }

    #[test]
    fn test_creation() {
        let csc = sample();
        assert_eq!(csc.nnz(), 5);
        assert_eq!(csc.rows(), 3);
        assert_eq!(csc.cols(), 3);
        assert_eq!(csc.outer_dim(), 3);
        assert_eq!(csc.inner_dim(), 3);
    }

    #[test]
    fn test_zeros() {
        let csc = CscMatrix::<f64>::zeros(5, 4, Orientation::ColumnMajor).unwrap();
        assert_eq!(csc.nnz(), 0);
        assert_eq!(csc.outer_ptr(), &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_rejects_zero_dims() {
        let r = CscMatrix::<f64>::zeros(0, 4, Orientation::ColumnMajor);
        assert!(matches!(
            r,
            Err(SparseError::Shape(ShapeError::ZeroDimension))
        ));
    }

    #[test]
    fn test_rejects_bad_outer_ptr_length() {
        let r = CscMatrix::from_parts(
            vec![1.0],
            vec![0],
            vec![0, 1],
            2,
            2,
            Orientation::ColumnMajor,
        );
        assert!(matches!(
            r,
            Err(SparseError::Shape(ShapeError::OuterPtrLength { .. }))
        ));
    }

    #[test]
    fn test_rejects_non_monotone_outer_ptr() {
        let r = CscMatrix::from_parts(
            vec![1.0, 2.0],
            vec![0, 1],
            vec![0, 2, 1, 2],
            2,
            3,
            Orientation::ColumnMajor,
        );
        assert!(matches!(
            r,
            Err(SparseError::Shape(ShapeError::OuterPtrNotMonotone { .. }))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let r = CscMatrix::from_parts(
            vec![1.0],
            vec![5],
            vec![0, 1, 1],
            3,
            2,
            Orientation::ColumnMajor,
        );
        assert!(matches!(
            r,
            Err(SparseError::Shape(ShapeError::IndexOutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_rejects_unsorted_slice() {
        let r = CscMatrix::from_parts(
            vec![1.0, 2.0],
            vec![2, 1],
            vec![0, 2],
            3,
            1,
            Orientation::ColumnMajor,
        );
        assert!(matches!(
            r,
            Err(SparseError::Shape(ShapeError::UnsortedIndices { .. }))
        ));
    }

    #[test]
    fn test_slice_access() {
        let csc = sample();

        let (rows, vals) = csc.slice(0).unwrap();
        assert_eq!(rows, &[0, 2]);
        assert_eq!(vals, &[1.0, 2.0]);

        let (rows, vals) = csc.slice(2).unwrap();
        assert_eq!(rows, &[0, 2]);
        assert_eq!(vals, &[4.0, 5.0]);

        assert!(csc.slice(3).is_none());
    }

    #[test]
    fn test_coeff() {
        let csc = sample();
        assert_eq!(csc.coeff(0, 0), 1.0);
        assert_eq!(csc.coeff(1, 1), 3.0);
        assert_eq!(csc.coeff(2, 2), 5.0);
        assert_eq!(csc.coeff(1, 0), 0.0);
        assert_eq!(csc.coeff(9, 9), 0.0);
    }

    #[test]
    fn test_sum_and_density() {
        let csc = sample();
        assert_eq!(csc.sum(), 15.0);
        assert!((csc.density() - 5.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_to_dense() {
        let csc = sample();
        let dense = csc.to_dense();
        assert_eq!(dense[[0, 0]], 1.0);
        assert_eq!(dense[[0, 2]], 4.0);
        assert_eq!(dense[[1, 1]], 3.0);
        assert_eq!(dense[[2, 0]], 2.0);
        assert_eq!(dense[[2, 2]], 5.0);
        assert_eq!(dense[[0, 1]], 0.0);
    }

    #[test]
    fn test_row_major_coeff() {
        // Same logical matrix, stored row-major.
        let csc = CscMatrix::from_parts(
            vec![1.0, 4.0, 3.0, 2.0, 5.0],
            vec![0, 2, 1, 0, 2],
            vec![0, 2, 3, 5],
            3,
            3,
            Orientation::RowMajor,
        )
        .unwrap();
        assert_eq!(csc.coeff(0, 0), 1.0);
        assert_eq!(csc.coeff(0, 2), 4.0);
        assert_eq!(csc.coeff(1, 1), 3.0);
        assert_eq!(csc.coeff(2, 0), 2.0);
    }
}
