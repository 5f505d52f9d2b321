//! Slice cursors and whole-matrix non-zero iterators
//!
//! Every storage level answers the same forward-only protocol: a slice
//! cursor yields `(inner index, value)` pairs and flags the first entry of
//! each value run, and a whole-matrix iterator flattens the slices in
//! ascending outer order into `(row, col, value)` triplets.
//!
//! Within a run, inner indices are strictly ascending; across runs the
//! order is the first-seen value order fixed at construction. Cursors
//! borrow the slice payload, so the borrow checker keeps them from
//! outliving or racing a mutation.
//!
//! # Examples
//!
//! ```
//! use vcsparse::{NonZeroIterator, Orientation, VcscMatrix};
//!
//! let m = VcscMatrix::from_coo(
//!     &[(0, 0, 5.0), (2, 0, 5.0), (1, 1, 9.0)],
//!     3,
//!     2,
//!     Orientation::ColumnMajor,
//! )
//! .unwrap();
//!
//! let triplets: Vec<_> = m.iter_nonzero().collect();
//! assert_eq!(triplets, vec![(0, 0, 5.0), (2, 0, 5.0), (1, 1, 9.0)]);
//! ```

use crate::codec::ByteCursor;
use crate::csc::CscMatrix;
use crate::ivcsc::IvcscMatrix;
use crate::matrix::SparseMatrix;
use crate::value::SparseValue;
use crate::vcsc::{ValueGroup, VcscMatrix};

/// One emission of a slice cursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceEntry<T> {
    /// Inner coordinate of the entry
    pub inner: usize,
    /// Stored value
    pub value: T,
    /// Whether this is the first entry of its value run
    pub new_run: bool,
}

// ============================================================================
// Slice cursors
// ============================================================================

/// Cursor over one VCSC slice: groups in stored order, indices ascending
/// within each group
pub struct VcscSliceIter<'a, T> {
    groups: &'a [ValueGroup<T>],
    group_idx: usize,
    index_idx: usize,
}

impl<'a, T: SparseValue> VcscSliceIter<'a, T> {
    pub(crate) fn new(groups: &'a [ValueGroup<T>]) -> Self {
        Self {
            groups,
            group_idx: 0,
            index_idx: 0,
        }
    }
}

impl<'a, T: SparseValue> Iterator for VcscSliceIter<'a, T> {
    type Item = SliceEntry<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.group_idx < self.groups.len() {
            let group = &self.groups[self.group_idx];
            if self.index_idx < group.indices().len() {
                let entry = SliceEntry {
                    inner: group.indices()[self.index_idx],
                    value: group.value(),
                    new_run: self.index_idx == 0,
                };
                self.index_idx += 1;
                return Some(entry);
            }

            self.group_idx += 1;
            self.index_idx = 0;
        }

        None
    }
}

/// Cursor over one packed IVCSC slice
///
/// Decodes runs on the fly: reads the run value and width, then one delta
/// per step. A zero delta word closes the run unless it is the run's first
/// index, which is the one place a legitimate zero word appears.
pub struct IvcscSliceIter<'a, T> {
    cursor: ByteCursor<'a>,
    value: T,
    width: u8,
    index: usize,
    start_of_run: bool,
    done: bool,
}

impl<'a, T: SparseValue> IvcscSliceIter<'a, T> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        let mut iter = Self {
            cursor: ByteCursor::new(bytes),
            value: T::zero(),
            width: 1,
            index: 0,
            start_of_run: false,
            done: bytes.is_empty(),
        };
        if !iter.done && !iter.read_run_header() {
            iter.done = true;
        }
        iter
    }

    /// Read the next run's value and index width; false at end of slice
    fn read_run_header(&mut self) -> bool {
        let bits = match self.cursor.read_uint(T::WIDTH as u8) {
            Some(bits) => bits,
            None => return false,
        };
        self.value = T::from_bits(bits);

        match self.cursor.read_uint(1) {
            Some(width) => {
                self.width = width as u8;
                self.start_of_run = true;
                true
            }
            None => false,
        }
    }
}

impl<'a, T: SparseValue> Iterator for IvcscSliceIter<'a, T> {
    type Item = SliceEntry<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            let delta = match self.cursor.read_uint(self.width) {
                Some(delta) => delta,
                None => {
                    self.done = true;
                    return None;
                }
            };

            if self.start_of_run {
                self.start_of_run = false;
                self.index = delta as usize;
                return Some(SliceEntry {
                    inner: self.index,
                    value: self.value,
                    new_run: true,
                });
            }

            if delta == 0 {
                // Delimiter: move to the next run, or finish the slice.
                if self.cursor.is_empty() || !self.read_run_header() {
                    self.done = true;
                    return None;
                }
                continue;
            }

            self.index += delta as usize;
            return Some(SliceEntry {
                inner: self.index,
                value: self.value,
                new_run: false,
            });
        }
    }
}

// ============================================================================
// Whole-matrix iterators
// ============================================================================

/// Trait for iterating all non-zero entries of a sparse matrix
pub trait NonZeroIterator<T: SparseValue> {
    /// Iterator yielding `(row, col, value)` triplets
    type Iter<'a>: Iterator<Item = (usize, usize, T)>
    where
        Self: 'a;

    /// Iterate all stored entries, outer slices in ascending order
    fn iter_nonzero(&self) -> Self::Iter<'_>;
}

/// All non-zero entries of a CSC matrix
pub struct CscNonZeroIter<'a, T> {
    matrix: &'a CscMatrix<T>,
    outer: usize,
    k: usize,
}

impl<'a, T: SparseValue> Iterator for CscNonZeroIter<'a, T> {
    type Item = (usize, usize, T);

    fn next(&mut self) -> Option<Self::Item> {
        while self.outer < self.matrix.outer_dim() {
            if self.k < self.matrix.outer_ptr()[self.outer + 1] {
                let inner = self.matrix.inner_indices()[self.k];
                let value = self.matrix.values()[self.k];
                let (row, col) = self.matrix.orientation().row_col(self.outer, inner);
                self.k += 1;
                return Some((row, col, value));
            }

            self.outer += 1;
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.matrix.nnz() - self.k;
        (remaining, Some(remaining))
    }
}

impl<'a, T: SparseValue> ExactSizeIterator for CscNonZeroIter<'a, T> {}

impl<T: SparseValue> NonZeroIterator<T> for CscMatrix<T> {
    type Iter<'a>
        = CscNonZeroIter<'a, T>
    where
        Self: 'a;

    fn iter_nonzero(&self) -> Self::Iter<'_> {
        CscNonZeroIter {
            matrix: self,
            outer: 0,
            k: 0,
        }
    }
}

/// All non-zero entries of a VCSC matrix
pub struct VcscNonZeroIter<'a, T> {
    matrix: &'a VcscMatrix<T>,
    outer: usize,
    slice: VcscSliceIter<'a, T>,
}

impl<'a, T: SparseValue> Iterator for VcscNonZeroIter<'a, T> {
    type Item = (usize, usize, T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.slice.next() {
                let (row, col) = self.matrix.orientation().row_col(self.outer, entry.inner);
                return Some((row, col, entry.value));
            }

            self.outer += 1;
            if self.outer >= self.matrix.outer_dim() {
                return None;
            }
            self.slice = VcscSliceIter::new(self.matrix.groups(self.outer));
        }
    }
}

impl<T: SparseValue> NonZeroIterator<T> for VcscMatrix<T> {
    type Iter<'a>
        = VcscNonZeroIter<'a, T>
    where
        Self: 'a;

    fn iter_nonzero(&self) -> Self::Iter<'_> {
        let slice = if self.outer_dim() > 0 {
            VcscSliceIter::new(self.groups(0))
        } else {
            VcscSliceIter::new(&[])
        };
        VcscNonZeroIter {
            matrix: self,
            outer: 0,
            slice,
        }
    }
}

/// All non-zero entries of an IVCSC matrix
pub struct IvcscNonZeroIter<'a, T> {
    matrix: &'a IvcscMatrix<T>,
    outer: usize,
    slice: IvcscSliceIter<'a, T>,
}

impl<'a, T: SparseValue> Iterator for IvcscNonZeroIter<'a, T> {
    type Item = (usize, usize, T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.slice.next() {
                let (row, col) = self.matrix.orientation().row_col(self.outer, entry.inner);
                return Some((row, col, entry.value));
            }

            self.outer += 1;
            if self.outer >= self.matrix.outer_dim() {
                return None;
            }
            self.slice = IvcscSliceIter::new(self.matrix.bytes(self.outer));
        }
    }
}

impl<T: SparseValue> NonZeroIterator<T> for IvcscMatrix<T> {
    type Iter<'a>
        = IvcscNonZeroIter<'a, T>
    where
        Self: 'a;

    fn iter_nonzero(&self) -> Self::Iter<'_> {
        let slice = if self.outer_dim() > 0 {
            IvcscSliceIter::new(self.bytes(0))
        } else {
            IvcscSliceIter::new(&[])
        };
        IvcscNonZeroIter {
            matrix: self,
            outer: 0,
            slice,
        }
    }
}
