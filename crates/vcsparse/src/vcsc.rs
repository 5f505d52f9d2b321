//! VCSC (Value-Compressed Sparse Column) storage — compression level 2
//!
//! Within each outer slice, entries are grouped by unique value: a slice is
//! an ordered sequence of `(value, indices)` groups, with groups in
//! first-seen order and indices strictly ascending inside each group. When a
//! slice holds few distinct values relative to its non-zero count, this
//! stores each value once instead of once per entry.
//!
//! VCSC is the warm representation: friendly to construction, random access
//! and restructuring. It is also the canonical intermediate form for
//! transposition and slice-at-a-time assembly of the packed level.
//!
//! # Examples
//!
//! ```
//! use vcsparse::{Orientation, SparseMatrix, VcscMatrix};
//!
//! // One column holding 5 at rows 0, 2, 3 and 9 at row 4.
//! let triplets = [(0, 0, 5.0), (2, 0, 5.0), (3, 0, 5.0), (4, 0, 9.0)];
//! let m = VcscMatrix::from_coo(&triplets, 6, 1, Orientation::ColumnMajor).unwrap();
//!
//! assert_eq!(m.nnz(), 4);
//! assert_eq!(m.unique_count(0), Some(2));
//! assert_eq!(m.slice_values(0), Some(vec![5.0, 9.0]));
//! assert_eq!(m.coeff(3, 0), 5.0);
//! ```

use crate::csc::{validate_parts, CscMatrix};
use crate::error::{ShapeError, SparseResult};
use crate::iterators::VcscSliceIter;
use crate::ivcsc::IvcscMatrix;
use crate::matrix::{Orientation, SparseMatrix};
use crate::value::SparseValue;
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView1, ArrayView2};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// One unique value of a slice together with the indices holding it
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGroup<T> {
    pub(crate) value: T,
    pub(crate) indices: Vec<usize>,
}

impl<T: SparseValue> ValueGroup<T> {
    /// The shared value
    pub fn value(&self) -> T {
        self.value
    }

    /// Ascending inner indices holding the value
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of entries in this group
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the group is empty (never true for stored groups)
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Accumulates one outer slice, keeping groups in first-seen value order
///
/// Values are keyed by bit pattern so that floats group under total
/// identity. Callers feed entries in ascending inner order, which keeps each
/// group's index list ascending without a sort.
pub(crate) struct SliceBuilder<T> {
    groups: Vec<ValueGroup<T>>,
    lookup: HashMap<u64, usize>,
}

impl<T: SparseValue> SliceBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            groups: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    pub(crate) fn push(&mut self, value: T, inner: usize) {
        match self.lookup.entry(value.to_bits()) {
            Entry::Occupied(slot) => self.groups[*slot.get()].indices.push(inner),
            Entry::Vacant(slot) => {
                slot.insert(self.groups.len());
                self.groups.push(ValueGroup {
                    value,
                    indices: vec![inner],
                });
            }
        }
    }

    pub(crate) fn finish(self) -> Vec<ValueGroup<T>> {
        self.groups
    }
}

/// Merge two ascending, disjoint index lists into one ascending list
fn merge_ascending(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Collapse groups whose values became bit-identical, preserving group order
///
/// Needed after scaling, where distinct values can map to the same product.
pub(crate) fn merge_equal_groups<T: SparseValue>(groups: &mut Vec<ValueGroup<T>>) {
    let mut lookup: HashMap<u64, usize> = HashMap::with_capacity(groups.len());
    let mut merged: Vec<ValueGroup<T>> = Vec::with_capacity(groups.len());

    for group in std::mem::take(groups) {
        match lookup.entry(group.value.to_bits()) {
            Entry::Occupied(slot) => {
                let target = &mut merged[*slot.get()];
                target.indices = merge_ascending(&target.indices, &group.indices);
            }
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(group);
            }
        }
    }

    *groups = merged;
}

/// Value-compressed sparse matrix (level 2)
#[derive(Debug, Clone, PartialEq)]
pub struct VcscMatrix<T> {
    slices: Vec<Vec<ValueGroup<T>>>,
    rows: usize,
    cols: usize,
    orientation: Orientation,
    nnz: usize,
}

impl<T: SparseValue> VcscMatrix<T> {
    pub(crate) fn from_raw_parts(
        slices: Vec<Vec<ValueGroup<T>>>,
        rows: usize,
        cols: usize,
        orientation: Orientation,
        nnz: usize,
    ) -> Self {
        debug_assert_eq!(slices.len(), orientation.outer_len(rows, cols));
        Self {
            slices,
            rows,
            cols,
            orientation,
            nnz,
        }
    }

    /// Build from a validated baseline CSC matrix
    pub fn from_csc(csc: &CscMatrix<T>) -> Self {
        let outer_dim = csc.outer_dim();
        let mut slices = Vec::with_capacity(outer_dim);
        for s in 0..outer_dim {
            let mut builder = SliceBuilder::new();
            if let Some((indices, values)) = csc.slice(s) {
                for (&inner, &value) in indices.iter().zip(values) {
                    builder.push(value, inner);
                }
            }
            slices.push(builder.finish());
        }

        Self::from_raw_parts(slices, csc.rows(), csc.cols(), csc.orientation(), csc.nnz())
    }

    /// Build from raw CSC arrays
    ///
    /// # Errors
    ///
    /// Same shape checks as [`CscMatrix::from_parts`].
    pub fn from_csc_parts(
        values: &[T],
        inner_indices: &[usize],
        outer_ptr: &[usize],
        rows: usize,
        cols: usize,
        orientation: Orientation,
    ) -> SparseResult<Self> {
        let inner_dim = orientation.inner_len(rows, cols);
        let outer_dim = orientation.outer_len(rows, cols);
        validate_parts(values.len(), inner_indices, outer_ptr, inner_dim, outer_dim)?;

        let mut slices = Vec::with_capacity(outer_dim);
        for s in 0..outer_dim {
            let mut builder = SliceBuilder::new();
            for k in outer_ptr[s]..outer_ptr[s + 1] {
                builder.push(values[k], inner_indices[k]);
            }
            slices.push(builder.finish());
        }

        Ok(Self::from_raw_parts(
            slices,
            rows,
            cols,
            orientation,
            values.len(),
        ))
    }

    /// Build from coordinate triplets `(row, col, value)`
    ///
    /// Triplets need not be sorted. Duplicate coordinates keep the last-seen
    /// value; zero values (including zero overwrites) are not stored.
    ///
    /// # Errors
    ///
    /// Returns a shape error on zero dimensions or out-of-range coordinates.
    pub fn from_coo(
        triplets: &[(usize, usize, T)],
        rows: usize,
        cols: usize,
        orientation: Orientation,
    ) -> SparseResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(ShapeError::ZeroDimension.into());
        }

        let mut entries = Vec::with_capacity(triplets.len());
        for &(row, col, value) in triplets {
            if row >= rows {
                return Err(ShapeError::IndexOutOfBounds {
                    index: row,
                    bound: rows,
                }
                .into());
            }
            if col >= cols {
                return Err(ShapeError::IndexOutOfBounds {
                    index: col,
                    bound: cols,
                }
                .into());
            }
            let (outer, inner) = orientation.outer_inner(row, col);
            entries.push((outer, inner, value));
        }

        // Stable, so equal coordinates keep their input order and the last
        // element of each equal range is the last-seen triplet.
        entries.sort_by_key(|&(outer, inner, _)| (outer, inner));

        let mut dedup: Vec<(usize, usize, T)> = Vec::with_capacity(entries.len());
        for entry in entries {
            match dedup.last_mut() {
                Some(last) if last.0 == entry.0 && last.1 == entry.1 => *last = entry,
                _ => dedup.push(entry),
            }
        }
        dedup.retain(|&(_, _, value)| !value.is_zero());

        let outer_dim = orientation.outer_len(rows, cols);
        let mut slices = Vec::with_capacity(outer_dim);
        let mut k = 0;
        for s in 0..outer_dim {
            let mut builder = SliceBuilder::new();
            while k < dedup.len() && dedup[k].0 == s {
                builder.push(dedup[k].2, dedup[k].1);
                k += 1;
            }
            slices.push(builder.finish());
        }

        Ok(Self::from_raw_parts(
            slices,
            rows,
            cols,
            orientation,
            dedup.len(),
        ))
    }

    /// Build a one-slice matrix from a dense vector; zeros are skipped
    pub fn from_slice(values: &[T], orientation: Orientation) -> SparseResult<Self> {
        if values.is_empty() {
            return Err(ShapeError::ZeroDimension.into());
        }

        let mut builder = SliceBuilder::new();
        let mut nnz = 0;
        for (inner, &value) in values.iter().enumerate() {
            if !value.is_zero() {
                builder.push(value, inner);
                nnz += 1;
            }
        }

        let (rows, cols) = match orientation {
            Orientation::ColumnMajor => (values.len(), 1),
            Orientation::RowMajor => (1, values.len()),
        };
        Ok(Self::from_raw_parts(
            vec![builder.finish()],
            rows,
            cols,
            orientation,
            nnz,
        ))
    }

    /// Build from a dense array, one outer slice at a time; exact zeros are
    /// skipped
    pub fn from_dense(dense: &ArrayView2<T>, orientation: Orientation) -> SparseResult<Self> {
        let (rows, cols) = (dense.nrows(), dense.ncols());
        if rows == 0 || cols == 0 {
            return Err(ShapeError::ZeroDimension.into());
        }

        let outer_dim = orientation.outer_len(rows, cols);
        let inner_dim = orientation.inner_len(rows, cols);
        let mut slices = Vec::with_capacity(outer_dim);
        let mut nnz = 0;
        for s in 0..outer_dim {
            let mut builder = SliceBuilder::new();
            for inner in 0..inner_dim {
                let (row, col) = orientation.row_col(s, inner);
                let value = dense[[row, col]];
                if !value.is_zero() {
                    builder.push(value, inner);
                    nnz += 1;
                }
            }
            slices.push(builder.finish());
        }

        Ok(Self::from_raw_parts(slices, rows, cols, orientation, nnz))
    }

    pub(crate) fn groups(&self, s: usize) -> &[ValueGroup<T>] {
        &self.slices[s]
    }

    /// Groups of one outer slice, in first-seen value order
    pub fn slice_groups(&self, s: usize) -> Option<&[ValueGroup<T>]> {
        self.slices.get(s).map(|slice| slice.as_slice())
    }

    /// Number of unique values in one outer slice
    pub fn unique_count(&self, s: usize) -> Option<usize> {
        self.slices.get(s).map(|slice| slice.len())
    }

    /// Unique values of one outer slice, in stored order
    pub fn slice_values(&self, s: usize) -> Option<Vec<T>> {
        self.slices
            .get(s)
            .map(|slice| slice.iter().map(|g| g.value).collect())
    }

    /// Entry count of each unique value of one outer slice
    pub fn slice_counts(&self, s: usize) -> Option<Vec<usize>> {
        self.slices
            .get(s)
            .map(|slice| slice.iter().map(|g| g.indices.len()).collect())
    }

    /// All inner indices of one outer slice, in stored group order
    pub fn slice_indices(&self, s: usize) -> Option<Vec<usize>> {
        self.slices.get(s).map(|slice| {
            slice
                .iter()
                .flat_map(|g| g.indices.iter().copied())
                .collect()
        })
    }

    /// Cursor over one outer slice
    pub fn iter_slice(&self, s: usize) -> Option<VcscSliceIter<'_, T>> {
        self.slices.get(s).map(|slice| VcscSliceIter::new(slice))
    }

    /// Append one outer slice from a dense vector; zeros are skipped
    ///
    /// # Errors
    ///
    /// Returns a shape error when the vector length differs from the inner
    /// dimension.
    pub fn append_slice(&mut self, values: &[T]) -> SparseResult<()> {
        if values.len() != self.inner_dim() {
            return Err(ShapeError::DimensionMismatch {
                expected: self.inner_dim(),
                got: values.len(),
            }
            .into());
        }

        let mut builder = SliceBuilder::new();
        let mut added = 0;
        for (inner, &value) in values.iter().enumerate() {
            if !value.is_zero() {
                builder.push(value, inner);
                added += 1;
            }
        }

        self.slices.push(builder.finish());
        match self.orientation {
            Orientation::ColumnMajor => self.cols += 1,
            Orientation::RowMajor => self.rows += 1,
        }
        self.nnz += added;
        Ok(())
    }

    /// Transposed copy of this matrix
    ///
    /// Builds a fresh matrix: one scratch slice per inner index, filled by a
    /// single pass over the source. Outer slices are visited in ascending
    /// order, so every scratch index list comes out ascending without a
    /// sort. Value counts, nnz and sum are preserved; the first-seen value
    /// order of the new slices follows the emission order of the source.
    pub fn transpose(&self) -> Self {
        let mut scratch: Vec<Vec<ValueGroup<T>>> = Vec::new();
        scratch.resize_with(self.inner_dim(), Vec::new);

        for (s, slice) in self.slices.iter().enumerate() {
            for group in slice {
                for &inner in &group.indices {
                    let groups = &mut scratch[inner];
                    let bits = group.value.to_bits();
                    match groups.iter_mut().find(|g| g.value.to_bits() == bits) {
                        Some(g) => g.indices.push(s),
                        None => groups.push(ValueGroup {
                            value: group.value,
                            indices: vec![s],
                        }),
                    }
                }
            }
        }

        Self::from_raw_parts(scratch, self.cols, self.rows, self.orientation, self.nnz)
    }

    /// Multiply every stored value by `factor`, in place
    ///
    /// Indices are untouched. Scaling by zero empties the matrix; values
    /// that collide after scaling are merged by an order-preserving union of
    /// their index lists.
    pub fn scalar_multiply(&mut self, factor: T) {
        if factor.is_zero() {
            for slice in &mut self.slices {
                slice.clear();
            }
            self.nnz = 0;
            return;
        }

        for slice in &mut self.slices {
            for group in slice.iter_mut() {
                group.value = group.value * factor;
            }
            merge_equal_groups(slice);
        }
    }

    /// Sparse matrix times dense vector
    ///
    /// # Errors
    ///
    /// Returns a shape error when `x` does not have `cols` entries.
    pub fn matvec(&self, x: &ArrayView1<T>) -> SparseResult<Array1<T>> {
        if x.len() != self.cols() {
            return Err(ShapeError::DimensionMismatch {
                expected: self.cols(),
                got: x.len(),
            }
            .into());
        }

        let mut y = Array1::from_elem(self.rows(), T::zero());
        for (s, slice) in self.slices.iter().enumerate() {
            for group in slice {
                for &inner in &group.indices {
                    match self.orientation {
                        Orientation::ColumnMajor => y[inner] = y[inner] + group.value * x[s],
                        Orientation::RowMajor => y[s] = y[s] + group.value * x[inner],
                    }
                }
            }
        }
        Ok(y)
    }

    /// Sparse matrix times dense matrix, as repeated matvec over the
    /// right-hand columns
    ///
    /// # Errors
    ///
    /// Returns a shape error when the inner dimensions disagree.
    pub fn spmm(&self, b: &ArrayView2<T>) -> SparseResult<Array2<T>> {
        if b.nrows() != self.cols() {
            return Err(ShapeError::DimensionMismatch {
                expected: self.cols(),
                got: b.nrows(),
            }
            .into());
        }

        let mut c = Array2::from_elem((self.rows(), b.ncols()), T::zero());
        for k in 0..b.ncols() {
            let y = self.matvec(&b.column(k))?;
            for (i, &v) in y.iter().enumerate() {
                c[[i, k]] = v;
            }
        }
        Ok(c)
    }

    /// Export to the baseline CSC representation
    pub fn to_csc(&self) -> CscMatrix<T> {
        let mut values = Vec::with_capacity(self.nnz);
        let mut inner_indices = Vec::with_capacity(self.nnz);
        let mut outer_ptr = Vec::with_capacity(self.outer_dim() + 1);
        outer_ptr.push(0);

        for slice in &self.slices {
            let mut entries: Vec<(usize, T)> = slice
                .iter()
                .flat_map(|g| g.indices.iter().map(move |&i| (i, g.value)))
                .collect();
            entries.sort_unstable_by_key(|&(inner, _)| inner);

            for (inner, value) in entries {
                inner_indices.push(inner);
                values.push(value);
            }
            outer_ptr.push(inner_indices.len());
        }

        CscMatrix::from_parts_unchecked(
            values,
            inner_indices,
            outer_ptr,
            self.rows,
            self.cols,
            self.orientation,
        )
    }

    /// Convert to the packed run representation (level 3)
    pub fn to_ivcsc(&self) -> IvcscMatrix<T> {
        IvcscMatrix::from_vcsc(self)
    }

    /// All stored entries as `(row, col, value)`, sorted by coordinates
    pub fn to_triplets(&self) -> Vec<(usize, usize, T)> {
        let mut triplets = Vec::with_capacity(self.nnz);
        for (s, slice) in self.slices.iter().enumerate() {
            for group in slice {
                for &inner in &group.indices {
                    let (row, col) = self.orientation.row_col(s, inner);
                    triplets.push((row, col, group.value));
                }
            }
        }
        triplets.sort_unstable_by_key(|&(row, col, _)| (row, col));
        triplets
    }

    /// Materialize as a dense array
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::from_elem((self.rows, self.cols), T::zero());
        for (s, slice) in self.slices.iter().enumerate() {
            for group in slice {
                for &inner in &group.indices {
                    let (row, col) = self.orientation.row_col(s, inner);
                    dense[[row, col]] = group.value;
                }
            }
        }
        dense
    }

    /// Serialized payload size in bytes (header excluded)
    pub fn byte_size(&self) -> usize {
        let index_bytes = usize::from(self.index_width());
        let mut total = 0;
        for slice in &self.slices {
            total += index_bytes; // num_unique
            total += slice.len() * (T::WIDTH + index_bytes); // values + counts
            total += slice.iter().map(|g| g.indices.len()).sum::<usize>() * index_bytes;
        }
        total
    }
}

impl<T: SparseValue> SparseMatrix<T> for VcscMatrix<T> {
    const COMPRESSION_LEVEL: u32 = 2;

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn nnz(&self) -> usize {
        self.nnz
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn coeff(&self, row: usize, col: usize) -> T {
        if row >= self.rows || col >= self.cols {
            return T::zero();
        }

        let (outer, inner) = self.orientation.outer_inner(row, col);
        for group in &self.slices[outer] {
            if group.indices.binary_search(&inner).is_ok() {
                return group.value;
            }
        }
        T::zero()
    }

    fn sum(&self) -> T {
        let mut acc = T::zero();
        for slice in &self.slices {
            for group in slice {
                for _ in &group.indices {
                    acc = acc + group.value;
                }
            }
        }
        acc
    }
}
