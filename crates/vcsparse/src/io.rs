//! Binary file format for all storage levels
//!
//! Every file starts with a fixed header of [`NUM_META_DATA`] little-endian
//! 32-bit words:
//!
//! ```text
//! [compression_level, inner_dim, outer_dim, nnz, value_type_tag, index_bytes]
//! ```
//!
//! followed by the level's payload. Level 1 (CSC) stores the values, the
//! inner indices and the outer pointer array back to back. Level 2 (VCSC)
//! stores, per slice, the unique-value count, the values, the per-value
//! counts and the ascending indices. Level 3 (IVCSC) stores, per slice, an
//! 8-byte length followed by the packed run bytes.
//!
//! Readers are strict and transactional: a wrong compression level, a value
//! type mismatch, a truncated or malformed payload, or an nnz inconsistency
//! fails with a format error and returns no partial matrix. The header does
//! not record orientation, so readers take the expected [`Orientation`] as
//! an argument.
//!
//! # Examples
//!
//! ```
//! use std::io::Cursor;
//! use vcsparse::{Orientation, SparseMatrix, VcscMatrix};
//!
//! let m = VcscMatrix::from_coo(
//!     &[(0, 0, 5.0), (2, 0, 5.0), (1, 1, 9.0)],
//!     3,
//!     2,
//!     Orientation::ColumnMajor,
//! )
//! .unwrap();
//!
//! let mut buf = Vec::new();
//! m.write_to(&mut buf).unwrap();
//!
//! let back = VcscMatrix::<f64>::read_from(
//!     &mut Cursor::new(&buf),
//!     Orientation::ColumnMajor,
//! )
//! .unwrap();
//! assert_eq!(back.nnz(), m.nnz());
//! ```

use crate::codec::{byte_width, write_uint, ByteCursor};
use crate::csc::CscMatrix;
use crate::error::{EncodingError, FormatError, SparseError, SparseResult};
use crate::ivcsc::{validate_slice, IvcscMatrix};
use crate::matrix::{Orientation, SparseMatrix};
use crate::value::{SparseValue, ValueKind};
use crate::vcsc::{ValueGroup, VcscMatrix};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Number of 32-bit words in the file header
pub const NUM_META_DATA: usize = 6;

/// Header fields after level and value-kind checks
struct RawHeader {
    inner_dim: usize,
    outer_dim: usize,
    nnz: usize,
    index_bytes: u8,
}

fn read_exact_or<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    context: &'static str,
) -> SparseResult<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            SparseError::Format(FormatError::Truncated { context })
        } else {
            SparseError::Io(e)
        }
    })
}

fn header_dim(dim: usize) -> Result<u32, EncodingError> {
    u32::try_from(dim).map_err(|_| EncodingError::HeaderOverflow { dim })
}

fn write_header<W: Write, T: SparseValue>(
    writer: &mut W,
    level: u32,
    inner_dim: usize,
    outer_dim: usize,
    nnz: usize,
    index_bytes: u8,
) -> SparseResult<()> {
    let words = [
        level,
        header_dim(inner_dim)?,
        header_dim(outer_dim)?,
        header_dim(nnz)?,
        T::KIND.encode(),
        u32::from(index_bytes),
    ];

    let mut buf = [0u8; 4 * NUM_META_DATA];
    for (i, word) in words.iter().enumerate() {
        buf[4 * i..4 * i + 4].copy_from_slice(&word.to_le_bytes());
    }
    writer.write_all(&buf)?;
    Ok(())
}

fn read_header<R: Read, T: SparseValue>(
    reader: &mut R,
    expected_level: u32,
) -> SparseResult<RawHeader> {
    let mut buf = [0u8; 4 * NUM_META_DATA];
    read_exact_or(reader, &mut buf, "header")?;

    let mut words = [0u32; NUM_META_DATA];
    for (i, word) in words.iter_mut().enumerate() {
        *word = u32::from_le_bytes([buf[4 * i], buf[4 * i + 1], buf[4 * i + 2], buf[4 * i + 3]]);
    }

    if words[0] != expected_level {
        return Err(FormatError::CompressionLevel {
            expected: expected_level,
            got: words[0],
        }
        .into());
    }

    let kind = ValueKind::decode(words[4])?;
    if kind != T::KIND {
        return Err(FormatError::ValueKindMismatch {
            expected: T::KIND.encode(),
            got: words[4],
        }
        .into());
    }

    if !matches!(words[5], 1 | 2 | 4 | 8) {
        return Err(FormatError::IndexWidth { got: words[5] }.into());
    }

    if words[1] == 0 || words[2] == 0 {
        return Err(FormatError::ZeroHeaderDimension.into());
    }

    Ok(RawHeader {
        inner_dim: words[1] as usize,
        outer_dim: words[2] as usize,
        nnz: words[3] as usize,
        index_bytes: words[5] as u8,
    })
}

fn header_dims_to_shape(orientation: Orientation, inner_dim: usize, outer_dim: usize) -> (usize, usize) {
    match orientation {
        Orientation::ColumnMajor => (inner_dim, outer_dim),
        Orientation::RowMajor => (outer_dim, inner_dim),
    }
}

// ============================================================================
// Level 1: CSC
// ============================================================================

impl<T: SparseValue> CscMatrix<T> {
    /// Serialize into a writer
    ///
    /// The serialized index type must also hold the outer pointer entries,
    /// so its width covers both the inner dimension and nnz.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> SparseResult<()> {
        let index_bytes = byte_width(self.inner_dim().max(self.nnz()) as u64);
        write_header::<_, T>(
            writer,
            Self::COMPRESSION_LEVEL,
            self.inner_dim(),
            self.outer_dim(),
            self.nnz(),
            index_bytes,
        )?;

        let mut buf = Vec::new();
        for &value in self.values() {
            write_uint(&mut buf, value.to_bits(), T::WIDTH as u8);
        }
        for &index in self.inner_indices() {
            write_uint(&mut buf, index as u64, index_bytes);
        }
        for &ptr in self.outer_ptr() {
            write_uint(&mut buf, ptr as u64, index_bytes);
        }
        writer.write_all(&buf)?;
        Ok(())
    }

    /// Deserialize from a reader
    ///
    /// # Errors
    ///
    /// Fails with a format error on level or value-type mismatch, truncated
    /// input, or a payload that violates the CSC invariants. No partial
    /// matrix is returned.
    pub fn read_from<R: Read>(reader: &mut R, orientation: Orientation) -> SparseResult<Self> {
        let header = read_header::<_, T>(reader, 1)?;

        let mut payload = Vec::new();
        reader.read_to_end(&mut payload)?;
        let mut cursor = ByteCursor::new(&payload);

        let mut values = Vec::new();
        for _ in 0..header.nnz {
            let bits = cursor.read_uint(T::WIDTH as u8).ok_or(FormatError::Truncated {
                context: "CSC values",
            })?;
            values.push(T::from_bits(bits));
        }

        let mut inner_indices = Vec::new();
        for _ in 0..header.nnz {
            let index = cursor
                .read_uint(header.index_bytes)
                .ok_or(FormatError::Truncated {
                    context: "CSC inner indices",
                })?;
            inner_indices.push(index as usize);
        }

        let mut outer_ptr = Vec::new();
        for _ in 0..header.outer_dim + 1 {
            let ptr = cursor
                .read_uint(header.index_bytes)
                .ok_or(FormatError::Truncated {
                    context: "CSC outer pointers",
                })?;
            outer_ptr.push(ptr as usize);
        }

        let (rows, cols) = header_dims_to_shape(orientation, header.inner_dim, header.outer_dim);
        match Self::from_parts(values, inner_indices, outer_ptr, rows, cols, orientation) {
            Ok(matrix) => Ok(matrix),
            Err(SparseError::Shape(e)) => Err(FormatError::BadPayload(e).into()),
            Err(e) => Err(e),
        }
    }

    /// Write to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> SparseResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)
    }

    /// Read from a file
    pub fn load<P: AsRef<Path>>(path: P, orientation: Orientation) -> SparseResult<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader, orientation)
    }
}

// ============================================================================
// Level 2: VCSC
// ============================================================================

impl<T: SparseValue> VcscMatrix<T> {
    /// Serialize into a writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> SparseResult<()> {
        let index_bytes = self.index_width();
        write_header::<_, T>(
            writer,
            Self::COMPRESSION_LEVEL,
            self.inner_dim(),
            self.outer_dim(),
            self.nnz(),
            index_bytes,
        )?;

        let mut buf = Vec::new();
        for s in 0..self.outer_dim() {
            let groups = self.groups(s);
            write_uint(&mut buf, groups.len() as u64, index_bytes);
            for group in groups {
                write_uint(&mut buf, group.value().to_bits(), T::WIDTH as u8);
            }
            for group in groups {
                write_uint(&mut buf, group.len() as u64, index_bytes);
            }
            for group in groups {
                for &index in group.indices() {
                    write_uint(&mut buf, index as u64, index_bytes);
                }
            }
        }
        writer.write_all(&buf)?;
        Ok(())
    }

    /// Deserialize from a reader
    ///
    /// # Errors
    ///
    /// Fails with a format error on level or value-type mismatch, truncated
    /// input, repeated value keys, empty runs, out-of-range or unsorted
    /// indices, or an nnz that disagrees with the header. No partial matrix
    /// is returned.
    pub fn read_from<R: Read>(reader: &mut R, orientation: Orientation) -> SparseResult<Self> {
        let header = read_header::<_, T>(reader, 2)?;

        let mut payload = Vec::new();
        reader.read_to_end(&mut payload)?;
        let mut cursor = ByteCursor::new(&payload);

        let mut slices = Vec::new();
        let mut total = 0usize;
        for s in 0..header.outer_dim {
            let num_unique = cursor
                .read_uint(header.index_bytes)
                .ok_or(FormatError::Truncated {
                    context: "slice unique count",
                })? as usize;

            let mut seen = HashSet::new();
            let mut values = Vec::new();
            for _ in 0..num_unique {
                let bits = cursor.read_uint(T::WIDTH as u8).ok_or(FormatError::Truncated {
                    context: "slice values",
                })?;
                if !seen.insert(bits) {
                    return Err(FormatError::DuplicateValue { slice: s }.into());
                }
                values.push(T::from_bits(bits));
            }

            let mut counts = Vec::new();
            for _ in 0..num_unique {
                let count = cursor
                    .read_uint(header.index_bytes)
                    .ok_or(FormatError::Truncated {
                        context: "slice counts",
                    })? as usize;
                if count == 0 {
                    return Err(FormatError::EmptyRun { slice: s }.into());
                }
                counts.push(count);
            }

            let mut groups = Vec::with_capacity(num_unique);
            for (value, count) in values.into_iter().zip(counts) {
                let mut indices = Vec::new();
                for k in 0..count {
                    let index = cursor
                        .read_uint(header.index_bytes)
                        .ok_or(FormatError::Truncated {
                            context: "slice indices",
                        })? as usize;
                    if index >= header.inner_dim {
                        return Err(FormatError::PayloadIndex {
                            slice: s,
                            index,
                            bound: header.inner_dim,
                        }
                        .into());
                    }
                    if k > 0 && indices[k - 1] >= index {
                        return Err(FormatError::PayloadUnsorted { slice: s }.into());
                    }
                    indices.push(index);
                }
                total += count;
                groups.push(ValueGroup { value, indices });
            }
            slices.push(groups);
        }

        if total != header.nnz {
            return Err(FormatError::NnzMismatch {
                header: header.nnz,
                payload: total,
            }
            .into());
        }

        let (rows, cols) = header_dims_to_shape(orientation, header.inner_dim, header.outer_dim);
        Ok(Self::from_raw_parts(slices, rows, cols, orientation, total))
    }

    /// Write to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> SparseResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)
    }

    /// Read from a file
    pub fn load<P: AsRef<Path>>(path: P, orientation: Orientation) -> SparseResult<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader, orientation)
    }
}

// ============================================================================
// Level 3: IVCSC
// ============================================================================

impl<T: SparseValue> IvcscMatrix<T> {
    /// Serialize into a writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> SparseResult<()> {
        write_header::<_, T>(
            writer,
            Self::COMPRESSION_LEVEL,
            self.inner_dim(),
            self.outer_dim(),
            self.nnz(),
            self.index_width(),
        )?;

        for s in 0..self.outer_dim() {
            let bytes = self.bytes(s);
            writer.write_all(&(bytes.len() as u64).to_le_bytes())?;
            writer.write_all(bytes)?;
        }
        Ok(())
    }

    /// Deserialize from a reader
    ///
    /// Every slice buffer is structurally validated before the matrix is
    /// assembled, so iteration over a loaded matrix cannot fail.
    ///
    /// # Errors
    ///
    /// Fails with a format error on level or value-type mismatch, a slice
    /// length reading past end of input, malformed runs, or an nnz that
    /// disagrees with the header. No partial matrix is returned.
    pub fn read_from<R: Read>(reader: &mut R, orientation: Orientation) -> SparseResult<Self> {
        let header = read_header::<_, T>(reader, 3)?;

        let mut payload = Vec::new();
        reader.read_to_end(&mut payload)?;
        let mut cursor = ByteCursor::new(&payload);

        let mut slices = Vec::new();
        let mut total = 0usize;
        for s in 0..header.outer_dim {
            let size = cursor.read_uint(8).ok_or(FormatError::Truncated {
                context: "slice size",
            })?;
            if size as usize > cursor.remaining() {
                return Err(FormatError::SliceOverrun { slice: s, size }.into());
            }

            let start = cursor.position();
            cursor.advance(size as usize).ok_or(FormatError::SliceOverrun {
                slice: s,
                size,
            })?;
            let bytes = payload[start..start + size as usize].to_vec();

            total += validate_slice::<T>(&bytes, header.inner_dim, s)?;
            slices.push(bytes);
        }

        if total != header.nnz {
            return Err(FormatError::NnzMismatch {
                header: header.nnz,
                payload: total,
            }
            .into());
        }

        let (rows, cols) = header_dims_to_shape(orientation, header.inner_dim, header.outer_dim);
        Ok(Self::from_raw_parts(slices, rows, cols, orientation, total))
    }

    /// Write to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> SparseResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)
    }

    /// Read from a file
    pub fn load<P: AsRef<Path>>(path: P, orientation: Orientation) -> SparseResult<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader, orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_vcsc() -> VcscMatrix<f64> {
        VcscMatrix::from_coo(
            &[
                (0, 0, 5.0),
                (2, 0, 5.0),
                (3, 0, 5.0),
                (4, 0, 9.0),
                (1, 2, 5.0),
            ],
            6,
            3,
            Orientation::ColumnMajor,
        )
        .unwrap()
    }

    #[test]
    fn test_header_layout() {
        let m = sample_vcsc();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        let words: Vec<u32> = buf[..24]
            .chunks(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let tag = <f64 as SparseValue>::KIND.encode();
        assert_eq!(words, vec![2, 6, 3, 5, tag, 1]);
    }

    #[test]
    fn test_vcsc_roundtrip_byte_identical() {
        let m = sample_vcsc();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        let back =
            VcscMatrix::<f64>::read_from(&mut Cursor::new(&buf), Orientation::ColumnMajor)
                .unwrap();
        assert_eq!(back.to_triplets(), m.to_triplets());
        assert_eq!(back.slice_values(0), m.slice_values(0));

        let mut again = Vec::new();
        back.write_to(&mut again).unwrap();
        assert_eq!(again, buf);
    }

    #[test]
    fn test_ivcsc_roundtrip_byte_identical() {
        let m = sample_vcsc().to_ivcsc();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        let back =
            IvcscMatrix::<f64>::read_from(&mut Cursor::new(&buf), Orientation::ColumnMajor)
                .unwrap();
        assert_eq!(back.to_triplets(), m.to_triplets());

        let mut again = Vec::new();
        back.write_to(&mut again).unwrap();
        assert_eq!(again, buf);
    }

    #[test]
    fn test_csc_roundtrip() {
        let m = sample_vcsc().to_csc();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        let back =
            CscMatrix::<f64>::read_from(&mut Cursor::new(&buf), Orientation::ColumnMajor).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_file_roundtrip_8x8() {
        // Two distinct values spread over four columns.
        let triplets = [
            (0, 0, 1.5),
            (3, 0, 1.5),
            (1, 2, 1.5),
            (7, 2, 2.5),
            (2, 5, 2.5),
            (6, 5, 1.5),
            (4, 7, 2.5),
        ];
        let m = IvcscMatrix::from_coo(&triplets, 8, 8, Orientation::ColumnMajor).unwrap();

        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();
        let back =
            IvcscMatrix::<f64>::read_from(&mut Cursor::new(&buf), Orientation::ColumnMajor)
                .unwrap();
        assert_eq!(back.to_triplets(), m.to_triplets());
    }

    #[test]
    fn test_level_mismatch_rejected() {
        let m = sample_vcsc();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        let r = IvcscMatrix::<f64>::read_from(&mut Cursor::new(&buf), Orientation::ColumnMajor);
        assert!(matches!(
            r,
            Err(SparseError::Format(FormatError::CompressionLevel {
                expected: 3,
                got: 2
            }))
        ));
    }

    #[test]
    fn test_value_kind_mismatch_rejected() {
        let m = sample_vcsc();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        let r = VcscMatrix::<f32>::read_from(&mut Cursor::new(&buf), Orientation::ColumnMajor);
        assert!(matches!(
            r,
            Err(SparseError::Format(FormatError::ValueKindMismatch { .. }))
        ));
    }

    #[test]
    fn test_truncated_rejected() {
        let m = sample_vcsc();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        let r = VcscMatrix::<f64>::read_from(
            &mut Cursor::new(&buf[..buf.len() - 3]),
            Orientation::ColumnMajor,
        );
        assert!(matches!(
            r,
            Err(SparseError::Format(FormatError::Truncated { .. }))
        ));

        let r = VcscMatrix::<f64>::read_from(&mut Cursor::new(&buf[..10]), Orientation::ColumnMajor);
        assert!(matches!(
            r,
            Err(SparseError::Format(FormatError::Truncated { .. }))
        ));
    }

    #[test]
    fn test_nnz_mismatch_rejected() {
        let m = sample_vcsc();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        // Bump the header nnz word.
        buf[12] += 1;
        let r = VcscMatrix::<f64>::read_from(&mut Cursor::new(&buf), Orientation::ColumnMajor);
        assert!(matches!(
            r,
            Err(SparseError::Format(FormatError::NnzMismatch { .. }))
        ));
    }

    #[test]
    fn test_ivcsc_slice_overrun_rejected() {
        let m = sample_vcsc().to_ivcsc();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();

        // Inflate the first slice's size field (8 bytes after the header).
        buf[24] = 0xFF;
        let r = IvcscMatrix::<f64>::read_from(&mut Cursor::new(&buf), Orientation::ColumnMajor);
        assert!(matches!(
            r,
            Err(SparseError::Format(FormatError::SliceOverrun { .. }))
        ));
    }

    #[test]
    fn test_row_major_roundtrip() {
        let m = VcscMatrix::from_coo(
            &[(0, 0, 1.0), (0, 2, 2.0), (1, 1, 3.0)],
            2,
            3,
            Orientation::RowMajor,
        )
        .unwrap();

        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();
        let back =
            VcscMatrix::<f64>::read_from(&mut Cursor::new(&buf), Orientation::RowMajor).unwrap();
        assert_eq!(back.rows(), 2);
        assert_eq!(back.cols(), 3);
        assert_eq!(back.to_triplets(), m.to_triplets());
    }

    #[test]
    fn test_save_and_load() {
        let m = sample_vcsc();
        let path = std::env::temp_dir().join("vcsparse_io_test.vcsc");
        m.save(&path).unwrap();

        let back = VcscMatrix::<f64>::load(&path, Orientation::ColumnMajor).unwrap();
        assert_eq!(back.to_triplets(), m.to_triplets());

        std::fs::remove_file(&path).ok();
    }
}
