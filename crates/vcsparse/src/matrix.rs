//! Storage orientation and the common sparse matrix surface
//!
//! Every storage level (CSC, VCSC, IVCSC) is a distinct type; the operations
//! they all answer — dimensions, non-zero count, element access, summation,
//! bounded dense rendering — live on the [`SparseMatrix`] trait. Conversions
//! between levels are explicit named operations on the concrete types.

use crate::codec::byte_width;
use crate::value::SparseValue;

/// Storage-order of a matrix
///
/// Column-major matrices store columns as outer slices (inner coordinate =
/// row); row-major matrices store rows as outer slices (inner coordinate =
/// column). All algorithms are parameterized by this choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Outer slices are columns
    ColumnMajor,
    /// Outer slices are rows
    RowMajor,
}

impl Orientation {
    /// Number of outer slices for a `rows` x `cols` matrix
    pub fn outer_len(self, rows: usize, cols: usize) -> usize {
        match self {
            Orientation::ColumnMajor => cols,
            Orientation::RowMajor => rows,
        }
    }

    /// Length of each outer slice for a `rows` x `cols` matrix
    pub fn inner_len(self, rows: usize, cols: usize) -> usize {
        match self {
            Orientation::ColumnMajor => rows,
            Orientation::RowMajor => cols,
        }
    }

    /// Map an (outer, inner) coordinate pair to (row, col)
    pub fn row_col(self, outer: usize, inner: usize) -> (usize, usize) {
        match self {
            Orientation::ColumnMajor => (inner, outer),
            Orientation::RowMajor => (outer, inner),
        }
    }

    /// Map a (row, col) coordinate pair to (outer, inner)
    pub fn outer_inner(self, row: usize, col: usize) -> (usize, usize) {
        match self {
            Orientation::ColumnMajor => (col, row),
            Orientation::RowMajor => (row, col),
        }
    }
}

/// Capability set shared by all storage levels
pub trait SparseMatrix<T: SparseValue> {
    /// Compression level of this representation (1 = CSC, 2 = VCSC,
    /// 3 = IVCSC), recorded in the file header
    const COMPRESSION_LEVEL: u32;

    /// Number of rows
    fn rows(&self) -> usize;

    /// Number of columns
    fn cols(&self) -> usize;

    /// Number of stored non-zero entries
    fn nnz(&self) -> usize;

    /// Storage orientation
    fn orientation(&self) -> Orientation;

    /// Element at (row, col); zero when absent or out of range
    fn coeff(&self, row: usize, col: usize) -> T;

    /// Sum of all stored entries
    fn sum(&self) -> T;

    /// Number of outer slices
    fn outer_dim(&self) -> usize {
        self.orientation().outer_len(self.rows(), self.cols())
    }

    /// Length of each outer slice
    fn inner_dim(&self) -> usize {
        self.orientation().inner_len(self.rows(), self.cols())
    }

    /// Byte width of the serialized index type, wide enough for every inner
    /// index and every per-slice count
    fn index_width(&self) -> u8 {
        byte_width(self.inner_dim() as u64)
    }

    /// Fraction of entries that are stored (nnz / rows*cols)
    fn density(&self) -> f64 {
        let total = self.rows() * self.cols();
        self.nnz() as f64 / total as f64
    }

    /// Render the matrix densely, one row per line
    ///
    /// Declines with `None` when either dimension exceeds `max_dim`, so
    /// callers cannot accidentally materialize a huge matrix as text.
    fn format_dense(&self, max_dim: usize) -> Option<String> {
        if self.rows() > max_dim || self.cols() > max_dim {
            return None;
        }

        let mut out = String::new();
        for row in 0..self.rows() {
            for col in 0..self.cols() {
                if col > 0 {
                    out.push(' ');
                }
                out.push_str(&self.coeff(row, col).to_string());
            }
            out.push('\n');
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_mapping() {
        let o = Orientation::ColumnMajor;
        assert_eq!(o.outer_len(4, 3), 3);
        assert_eq!(o.inner_len(4, 3), 4);
        assert_eq!(o.row_col(1, 2), (2, 1));
        assert_eq!(o.outer_inner(2, 1), (1, 2));

        let o = Orientation::RowMajor;
        assert_eq!(o.outer_len(4, 3), 4);
        assert_eq!(o.inner_len(4, 3), 3);
        assert_eq!(o.row_col(1, 2), (1, 2));
        assert_eq!(o.outer_inner(1, 2), (1, 2));
    }

    #[test]
    fn test_outer_inner_inverse() {
        for &o in &[Orientation::ColumnMajor, Orientation::RowMajor] {
            for row in 0..3 {
                for col in 0..3 {
                    let (outer, inner) = o.outer_inner(row, col);
                    assert_eq!(o.row_col(outer, inner), (row, col));
                }
            }
        }
    }
}
