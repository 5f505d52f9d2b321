//! IVCSC (Indexed Value-Compressed Sparse Column) storage — compression
//! level 3
//!
//! The packed form of VCSC: each outer slice is one byte buffer holding, per
//! unique value, a run of
//!
//! 1. the value, at its full byte width
//! 2. one byte giving the index width `w` in {1, 2, 4, 8}
//! 3. the first index absolute, then the positive deltas between successive
//!    indices, each `w` bytes little-endian
//! 4. one all-zero word of width `w` closing the run
//!
//! The width is chosen per run from the largest delta, so dense runs of
//! nearby indices cost one byte each regardless of the matrix size. The only
//! ambiguous zero word is a run's first index, which the cursor resolves
//! with its first-index flag.
//!
//! This is the cold representation: maximally compact, reached through
//! iteration only, mutable only by in-place value scaling.
//!
//! # Examples
//!
//! ```
//! use vcsparse::{IvcscMatrix, Orientation, SparseMatrix};
//!
//! let triplets = [(0, 0, 5i64), (2, 0, 5), (3, 0, 5), (4, 0, 9)];
//! let m = IvcscMatrix::from_coo(&triplets, 6, 1, Orientation::ColumnMajor).unwrap();
//!
//! // Two runs: value 5 over indices {0, 2, 3}, value 9 over {4}.
//! assert_eq!(m.nnz(), 4);
//! assert_eq!(m.coeff(3, 0), 5);
//! assert_eq!(m.coeff(4, 0), 9);
//! ```

use crate::codec::{byte_width, write_uint, ByteCursor};
use crate::csc::CscMatrix;
use crate::error::{FormatError, ShapeError, SparseResult};
use crate::iterators::IvcscSliceIter;
use crate::matrix::{Orientation, SparseMatrix};
use crate::value::SparseValue;
use crate::vcsc::{merge_equal_groups, SliceBuilder, ValueGroup, VcscMatrix};
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView1, ArrayView2};
use std::collections::HashSet;
use std::marker::PhantomData;

/// Pack one slice's value groups into the run encoding
pub(crate) fn pack_slice<T: SparseValue>(groups: &[ValueGroup<T>]) -> Vec<u8> {
    let mut buf = Vec::new();
    for group in groups {
        let indices = group.indices();
        write_uint(&mut buf, group.value().to_bits(), T::WIDTH as u8);

        let mut max_delta = indices[0] as u64;
        for pair in indices.windows(2) {
            max_delta = max_delta.max((pair[1] - pair[0]) as u64);
        }
        let width = byte_width(max_delta);
        buf.push(width);

        write_uint(&mut buf, indices[0] as u64, width);
        for pair in indices.windows(2) {
            write_uint(&mut buf, (pair[1] - pair[0]) as u64, width);
        }
        write_uint(&mut buf, 0, width);
    }
    buf
}

/// Decode a packed slice back into value groups
///
/// Runs are already grouped on the wire, so this is a single pass.
fn decode_groups<T: SparseValue>(bytes: &[u8]) -> Vec<ValueGroup<T>> {
    let mut groups: Vec<ValueGroup<T>> = Vec::new();
    for entry in IvcscSliceIter::<T>::new(bytes) {
        if entry.new_run {
            groups.push(ValueGroup {
                value: entry.value,
                indices: vec![entry.inner],
            });
        } else if let Some(last) = groups.last_mut() {
            last.indices.push(entry.inner);
        }
    }
    groups
}

/// Byte offset and bit pattern of each run's value field
fn run_value_slots<T: SparseValue>(bytes: &[u8]) -> Vec<(usize, u64)> {
    let mut cursor = ByteCursor::new(bytes);
    let mut slots = Vec::new();

    while !cursor.is_empty() {
        let pos = cursor.position();
        let bits = match cursor.read_uint(T::WIDTH as u8) {
            Some(bits) => bits,
            None => break,
        };
        let width = match cursor.read_uint(1) {
            Some(width) => width as u8,
            None => break,
        };
        slots.push((pos, bits));

        let mut first = true;
        loop {
            let delta = match cursor.read_uint(width) {
                Some(delta) => delta,
                None => break,
            };
            if delta == 0 && !first {
                break;
            }
            first = false;
        }
    }
    slots
}

/// Structurally validate a packed slice buffer read from a file
///
/// Walks every run, checking widths, index bounds, delimiters and value-key
/// uniqueness, and returns the number of entries the slice holds. Buffers
/// that pass are safe for the cursor, which never errors mid-iteration.
pub(crate) fn validate_slice<T: SparseValue>(
    bytes: &[u8],
    inner_dim: usize,
    slice: usize,
) -> Result<usize, FormatError> {
    let mut cursor = ByteCursor::new(bytes);
    let mut seen = HashSet::new();
    let mut count = 0usize;

    while !cursor.is_empty() {
        let bits = cursor
            .read_uint(T::WIDTH as u8)
            .ok_or(FormatError::Truncated {
                context: "run value",
            })?;
        if !seen.insert(bits) {
            return Err(FormatError::DuplicateValue { slice });
        }

        let width = cursor.read_uint(1).ok_or(FormatError::Truncated {
            context: "run width",
        })? as u8;
        if !matches!(width, 1 | 2 | 4 | 8) {
            return Err(FormatError::RunWidth { slice, got: width });
        }

        let first = cursor.read_uint(width).ok_or(FormatError::Truncated {
            context: "run first index",
        })?;
        let mut index = first as usize;
        if index >= inner_dim {
            return Err(FormatError::PayloadIndex {
                slice,
                index,
                bound: inner_dim,
            });
        }
        count += 1;

        loop {
            let delta = cursor.read_uint(width).ok_or(FormatError::Truncated {
                context: "run delta",
            })?;
            if delta == 0 {
                break;
            }
            index = index
                .checked_add(delta as usize)
                .filter(|&next| next < inner_dim)
                .ok_or(FormatError::PayloadIndex {
                    slice,
                    index,
                    bound: inner_dim,
                })?;
            count += 1;
        }
    }

    Ok(count)
}

/// Packed value-compressed sparse matrix (level 3)
#[derive(Debug, Clone, PartialEq)]
pub struct IvcscMatrix<T> {
    slices: Vec<Vec<u8>>,
    rows: usize,
    cols: usize,
    orientation: Orientation,
    nnz: usize,
    _value: PhantomData<T>,
}

impl<T: SparseValue> IvcscMatrix<T> {
    pub(crate) fn from_raw_parts(
        slices: Vec<Vec<u8>>,
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
            _value: PhantomData,
        }
    }

    /// Pack a VCSC matrix
    pub fn from_vcsc(vcsc: &VcscMatrix<T>) -> Self {
        let slices = (0..vcsc.outer_dim())
            .map(|s| pack_slice(vcsc.groups(s)))
            .collect();
        Self::from_raw_parts(
            slices,
            vcsc.rows(),
            vcsc.cols(),
            vcsc.orientation(),
            vcsc.nnz(),
        )
    }

    /// Build from a validated baseline CSC matrix
    pub fn from_csc(csc: &CscMatrix<T>) -> Self {
        Self::from_vcsc(&VcscMatrix::from_csc(csc))
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
        let vcsc =
            VcscMatrix::from_csc_parts(values, inner_indices, outer_ptr, rows, cols, orientation)?;
        Ok(Self::from_vcsc(&vcsc))
    }

    /// Build from coordinate triplets `(row, col, value)`
    ///
    /// Same semantics as [`VcscMatrix::from_coo`]: unsorted input, last-seen
    /// duplicate wins, zeros skipped.
    pub fn from_coo(
        triplets: &[(usize, usize, T)],
        rows: usize,
        cols: usize,
        orientation: Orientation,
    ) -> SparseResult<Self> {
        Ok(Self::from_vcsc(&VcscMatrix::from_coo(
            triplets,
            rows,
            cols,
            orientation,
        )?))
    }

    /// Build a one-slice matrix from a dense vector; zeros are skipped
    pub fn from_slice(values: &[T], orientation: Orientation) -> SparseResult<Self> {
        Ok(Self::from_vcsc(&VcscMatrix::from_slice(
            values,
            orientation,
        )?))
    }

    /// Build from a dense array; exact zeros are skipped
    pub fn from_dense(dense: &ArrayView2<T>, orientation: Orientation) -> SparseResult<Self> {
        Ok(Self::from_vcsc(&VcscMatrix::from_dense(
            dense,
            orientation,
        )?))
    }

    pub(crate) fn bytes(&self, s: usize) -> &[u8] {
        &self.slices[s]
    }

    /// Packed bytes of one outer slice
    pub fn slice_bytes(&self, s: usize) -> Option<&[u8]> {
        self.slices.get(s).map(|slice| slice.as_slice())
    }

    /// Cursor over one outer slice
    pub fn iter_slice(&self, s: usize) -> Option<IvcscSliceIter<'_, T>> {
        self.slices.get(s).map(|slice| IvcscSliceIter::new(slice))
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
        let groups = builder.finish();

        self.slices.push(pack_slice(&groups));
        match self.orientation {
            Orientation::ColumnMajor => self.cols += 1,
            Orientation::RowMajor => self.rows += 1,
        }
        self.nnz += added;
        Ok(())
    }

    /// Transposed copy of this matrix
    ///
    /// Goes through the value-grouped form, which is the canonical
    /// intermediate for restructuring, then re-packs.
    pub fn transpose(&self) -> Self {
        self.to_vcsc().transpose().to_ivcsc()
    }

    /// Multiply every stored value by `factor`, in place
    ///
    /// Only the value fields are rewritten; index bytes stay untouched.
    /// Scaling by zero empties the matrix. When two runs of a slice collide
    /// on the scaled value, the slice is re-encoded with their index lists
    /// merged.
    pub fn scalar_multiply(&mut self, factor: T) {
        if factor.is_zero() {
            for slice in &mut self.slices {
                slice.clear();
            }
            self.nnz = 0;
            return;
        }

        for s in 0..self.slices.len() {
            let slots = run_value_slots::<T>(&self.slices[s]);
            let scaled: Vec<u64> = slots
                .iter()
                .map(|&(_, bits)| (T::from_bits(bits) * factor).to_bits())
                .collect();

            let mut sorted = scaled.clone();
            sorted.sort_unstable();
            let collision = sorted.windows(2).any(|pair| pair[0] == pair[1]);

            if collision {
                let mut groups = decode_groups::<T>(&self.slices[s]);
                for group in &mut groups {
                    group.value = group.value * factor;
                }
                merge_equal_groups(&mut groups);
                self.slices[s] = pack_slice(&groups);
            } else {
                let buf = &mut self.slices[s];
                for (&(pos, _), &bits) in slots.iter().zip(&scaled) {
                    let le = bits.to_le_bytes();
                    buf[pos..pos + T::WIDTH].copy_from_slice(&le[..T::WIDTH]);
                }
            }
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
            for entry in IvcscSliceIter::<T>::new(slice) {
                match self.orientation {
                    Orientation::ColumnMajor => {
                        y[entry.inner] = y[entry.inner] + entry.value * x[s]
                    }
                    Orientation::RowMajor => y[s] = y[s] + entry.value * x[entry.inner],
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

    /// Unpack into the value-grouped representation (level 2)
    pub fn to_vcsc(&self) -> VcscMatrix<T> {
        let slices = self
            .slices
            .iter()
            .map(|bytes| decode_groups::<T>(bytes))
            .collect();
        VcscMatrix::from_raw_parts(slices, self.rows, self.cols, self.orientation, self.nnz)
    }

    /// Export to the baseline CSC representation
    pub fn to_csc(&self) -> CscMatrix<T> {
        self.to_vcsc().to_csc()
    }

    /// All stored entries as `(row, col, value)`, sorted by coordinates
    pub fn to_triplets(&self) -> Vec<(usize, usize, T)> {
        let mut triplets = Vec::with_capacity(self.nnz);
        for (s, slice) in self.slices.iter().enumerate() {
            for entry in IvcscSliceIter::<T>::new(slice) {
                let (row, col) = self.orientation.row_col(s, entry.inner);
                triplets.push((row, col, entry.value));
            }
        }
        triplets.sort_unstable_by_key(|&(row, col, _)| (row, col));
        triplets
    }

    /// Materialize as a dense array
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::from_elem((self.rows, self.cols), T::zero());
        for (s, slice) in self.slices.iter().enumerate() {
            for entry in IvcscSliceIter::<T>::new(slice) {
                let (row, col) = self.orientation.row_col(s, entry.inner);
                dense[[row, col]] = entry.value;
            }
        }
        dense
    }

    /// Serialized payload size in bytes (header excluded)
    pub fn byte_size(&self) -> usize {
        8 * self.slices.len() + self.slices.iter().map(|slice| slice.len()).sum::<usize>()
    }
}

impl<T: SparseValue> SparseMatrix<T> for IvcscMatrix<T> {
    const COMPRESSION_LEVEL: u32 = 3;

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
        for entry in IvcscSliceIter::<T>::new(&self.slices[outer]) {
            if entry.inner == inner {
                return entry.value;
            }
        }
        T::zero()
    }

    fn sum(&self) -> T {
        let mut acc = T::zero();
        for slice in &self.slices {
            for entry in IvcscSliceIter::<T>::new(slice) {
                acc = acc + entry.value;
            }
        }
        acc
    }
}
