//! Property-based tests for value-compressed sparse storage
//!
//! These tests use proptest to verify emission completeness, transpose and
//! scaling laws, level round-trips and file round-trips against a plain
//! coordinate-map model.

use proptest::prelude::*;
use scirs2_core::ndarray_ext::Array1;
use std::collections::HashMap;
use std::io::Cursor;
use vcsparse::{IvcscMatrix, NonZeroIterator, Orientation, SparseMatrix, VcscMatrix};

// ============================================================================
// Test Utilities
// ============================================================================

type Triplets = Vec<(usize, usize, f64)>;

/// Random triplets over a small value vocabulary, so slices actually repeat
/// values
fn triplet_strategy(nrows: usize, ncols: usize, max_nnz: usize) -> impl Strategy<Value = Triplets> {
    prop::collection::vec(
        (
            0..nrows,
            0..ncols,
            prop::sample::select(vec![1.0, 2.0, 5.0, -3.0, 0.25]),
        ),
        0..=max_nnz,
    )
}

/// The model: a coordinate map with last-seen-wins duplicate handling
fn reference(triplets: &[(usize, usize, f64)]) -> Vec<(usize, usize, f64)> {
    let mut map: HashMap<(usize, usize), f64> = HashMap::new();
    for &(row, col, value) in triplets {
        map.insert((row, col), value);
    }

    let mut out: Vec<_> = map
        .into_iter()
        .filter(|&(_, value)| value != 0.0)
        .map(|((row, col), value)| (row, col, value))
        .collect();
    out.sort_by_key(|&(row, col, _)| (row, col));
    out
}

fn transposed(triplets: &[(usize, usize, f64)]) -> Vec<(usize, usize, f64)> {
    let mut out: Vec<_> = triplets
        .iter()
        .map(|&(row, col, value)| (col, row, value))
        .collect();
    out.sort_by_key(|&(row, col, _)| (row, col));
    out
}

fn dot(x: &Array1<f64>, y: &Array1<f64>) -> f64 {
    x.iter().zip(y.iter()).map(|(a, b)| a * b).sum()
}

// ============================================================================
// Emission completeness
// ============================================================================

proptest! {
    /// Property: both levels emit exactly the model's triplet multiset
    #[test]
    fn prop_emission_matches_model(triplets in triplet_strategy(10, 10, 40)) {
        let expected = reference(&triplets);

        let vcsc = VcscMatrix::from_coo(&triplets, 10, 10, Orientation::ColumnMajor).unwrap();
        prop_assert_eq!(vcsc.to_triplets(), expected.clone());
        prop_assert_eq!(vcsc.nnz(), expected.len());

        let ivcsc = IvcscMatrix::from_coo(&triplets, 10, 10, Orientation::ColumnMajor).unwrap();
        prop_assert_eq!(ivcsc.to_triplets(), expected.clone());

        let mut collected: Vec<_> = vcsc.iter_nonzero().collect();
        collected.sort_by_key(|&(row, col, _)| (row, col));
        prop_assert_eq!(collected, expected);
    }

    /// Property: coeff agrees with the model everywhere
    #[test]
    fn prop_coeff_matches_model(triplets in triplet_strategy(6, 6, 20)) {
        let expected = reference(&triplets);
        let lookup: HashMap<(usize, usize), f64> = expected
            .iter()
            .map(|&(row, col, value)| ((row, col), value))
            .collect();

        let vcsc = VcscMatrix::from_coo(&triplets, 6, 6, Orientation::ColumnMajor).unwrap();
        let ivcsc = vcsc.to_ivcsc();
        for row in 0..6 {
            for col in 0..6 {
                let want = lookup.get(&(row, col)).copied().unwrap_or(0.0);
                prop_assert_eq!(vcsc.coeff(row, col), want);
                prop_assert_eq!(ivcsc.coeff(row, col), want);
            }
        }
    }
}

// ============================================================================
// Transpose laws
// ============================================================================

proptest! {
    /// Property: transpose preserves nnz and sum, and is an involution
    #[test]
    fn prop_transpose_laws(triplets in triplet_strategy(9, 7, 30)) {
        let m = VcscMatrix::from_coo(&triplets, 9, 7, Orientation::ColumnMajor).unwrap();
        let t = m.transpose();

        prop_assert_eq!(t.rows(), 7);
        prop_assert_eq!(t.cols(), 9);
        prop_assert_eq!(t.nnz(), m.nnz());
        prop_assert!((t.sum() - m.sum()).abs() < 1e-9);
        prop_assert_eq!(t.to_triplets(), transposed(&m.to_triplets()));

        let tt = t.transpose();
        prop_assert_eq!(tt.to_triplets(), m.to_triplets());
    }

    /// Property: the packed level transposes identically
    #[test]
    fn prop_transpose_matches_across_levels(triplets in triplet_strategy(8, 8, 24)) {
        let vcsc = VcscMatrix::from_coo(&triplets, 8, 8, Orientation::ColumnMajor).unwrap();
        let ivcsc = vcsc.to_ivcsc();
        prop_assert_eq!(
            ivcsc.transpose().to_triplets(),
            vcsc.transpose().to_triplets()
        );
    }
}

// ============================================================================
// Level and file round-trips
// ============================================================================

proptest! {
    /// Property: VCSC -> IVCSC -> VCSC preserves the emission multiset
    #[test]
    fn prop_vcsc_ivcsc_roundtrip(triplets in triplet_strategy(10, 10, 40)) {
        let m = VcscMatrix::from_coo(&triplets, 10, 10, Orientation::ColumnMajor).unwrap();
        let back = m.to_ivcsc().to_vcsc();
        prop_assert_eq!(back.to_triplets(), m.to_triplets());
    }

    /// Property: CSC export and re-import preserves the emission multiset
    #[test]
    fn prop_csc_roundtrip(triplets in triplet_strategy(10, 10, 40)) {
        let m = VcscMatrix::from_coo(&triplets, 10, 10, Orientation::ColumnMajor).unwrap();
        let back = m.to_csc().to_vcsc();
        prop_assert_eq!(back.to_triplets(), m.to_triplets());
    }

    /// Property: file round-trip preserves emissions and re-serializes
    /// byte-identically
    #[test]
    fn prop_file_roundtrip(triplets in triplet_strategy(10, 10, 40)) {
        let m = VcscMatrix::from_coo(&triplets, 10, 10, Orientation::ColumnMajor).unwrap();
        let mut buf = Vec::new();
        m.write_to(&mut buf).unwrap();
        let back = VcscMatrix::<f64>::read_from(
            &mut Cursor::new(&buf),
            Orientation::ColumnMajor,
        )
        .unwrap();
        prop_assert_eq!(back.to_triplets(), m.to_triplets());

        let mut again = Vec::new();
        back.write_to(&mut again).unwrap();
        prop_assert_eq!(again, buf);

        let packed = m.to_ivcsc();
        let mut buf = Vec::new();
        packed.write_to(&mut buf).unwrap();
        let back = IvcscMatrix::<f64>::read_from(
            &mut Cursor::new(&buf),
            Orientation::ColumnMajor,
        )
        .unwrap();
        prop_assert_eq!(back.to_triplets(), packed.to_triplets());

        let mut again = Vec::new();
        back.write_to(&mut again).unwrap();
        prop_assert_eq!(again, buf);
    }
}

// ============================================================================
// Scaling and multiplication laws
// ============================================================================

proptest! {
    /// Property: scaling by k scales the sum; by 1 is identity; by 0 empties
    #[test]
    fn prop_scalar_laws(triplets in triplet_strategy(8, 8, 24)) {
        let m = VcscMatrix::from_coo(&triplets, 8, 8, Orientation::ColumnMajor).unwrap();

        let mut doubled = m.clone();
        doubled.scalar_multiply(2.0);
        prop_assert!((doubled.sum() - 2.0 * m.sum()).abs() < 1e-9);
        prop_assert_eq!(doubled.nnz(), m.nnz());

        let mut same = m.clone();
        same.scalar_multiply(1.0);
        prop_assert_eq!(same.to_triplets(), m.to_triplets());

        let mut emptied = m.clone();
        emptied.scalar_multiply(0.0);
        prop_assert_eq!(emptied.nnz(), 0);

        let mut packed = m.to_ivcsc();
        packed.scalar_multiply(2.0);
        prop_assert_eq!(packed.to_triplets(), doubled.to_triplets());
    }

    /// Property: SpMV is linear in both the matrix scale and the vector
    #[test]
    fn prop_spmv_linearity(
        triplets in triplet_strategy(8, 8, 24),
        x in prop::collection::vec(-3.0..3.0f64, 8),
        y in prop::collection::vec(-3.0..3.0f64, 8),
    ) {
        let m = VcscMatrix::from_coo(&triplets, 8, 8, Orientation::ColumnMajor).unwrap();
        let x = Array1::from(x);
        let y = Array1::from(y);

        // (2M) x == 2 (M x)
        let mut scaled = m.clone();
        scaled.scalar_multiply(2.0);
        let lhs = scaled.matvec(&x.view()).unwrap();
        let rhs = m.matvec(&x.view()).unwrap();
        for i in 0..8 {
            prop_assert!((lhs[i] - 2.0 * rhs[i]).abs() < 1e-9);
        }

        // M (x + y) == M x + M y
        let sum = &x + &y;
        let lhs = m.matvec(&sum.view()).unwrap();
        let mx = m.matvec(&x.view()).unwrap();
        let my = m.matvec(&y.view()).unwrap();
        for i in 0..8 {
            prop_assert!((lhs[i] - (mx[i] + my[i])).abs() < 1e-9);
        }
    }

    /// Property: <Mx, y> == <x, M^T y>
    #[test]
    fn prop_transpose_adjoint(
        triplets in triplet_strategy(8, 8, 24),
        x in prop::collection::vec(-3.0..3.0f64, 8),
        y in prop::collection::vec(-3.0..3.0f64, 8),
    ) {
        let m = VcscMatrix::from_coo(&triplets, 8, 8, Orientation::ColumnMajor).unwrap();
        let x = Array1::from(x);
        let y = Array1::from(y);

        let mx = m.matvec(&x.view()).unwrap();
        let mty = m.transpose().matvec(&y.view()).unwrap();
        prop_assert!((dot(&mx, &y) - dot(&x, &mty)).abs() < 1e-9);
    }

    /// Property: the packed level multiplies identically
    #[test]
    fn prop_matvec_matches_across_levels(
        triplets in triplet_strategy(8, 8, 24),
        x in prop::collection::vec(-3.0..3.0f64, 8),
    ) {
        let vcsc = VcscMatrix::from_coo(&triplets, 8, 8, Orientation::ColumnMajor).unwrap();
        let ivcsc = vcsc.to_ivcsc();
        let x = Array1::from(x);

        let a = vcsc.matvec(&x.view()).unwrap();
        let b = ivcsc.matvec(&x.view()).unwrap();
        for i in 0..8 {
            prop_assert_eq!(a[i], b[i]);
        }
    }
}
