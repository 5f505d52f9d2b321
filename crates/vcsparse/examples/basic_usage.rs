//! Basic Value-Compressed Storage Example
//!
//! This example demonstrates fundamental operations including:
//! - Building matrices from coordinate triplets
//! - Inspecting per-slice value groups
//! - Sparse matrix-vector multiplication (SpMV)
//! - Transposition and in-place scaling
//! - Packing into the compact run representation
//!
//! Run with: cargo run --example basic_usage

use scirs2_core::ndarray_ext::array;
use vcsparse::{Orientation, SparseMatrix, VcscMatrix};

fn main() -> anyhow::Result<()> {
    println!("=== vcsparse: Basic Usage Example ===\n");

    // 1. Build a 6x3 matrix whose columns repeat values.
    println!("1. Building a 6x3 matrix from triplets...");
    let triplets = [
        (0, 0, 5.0),
        (2, 0, 5.0),
        (3, 0, 5.0),
        (4, 0, 9.0),
        (1, 1, 7.0),
        (0, 2, 5.0),
        (5, 2, 5.0),
    ];
    let m = VcscMatrix::from_coo(&triplets, 6, 3, Orientation::ColumnMajor)?;
    println!("   shape: {}x{}, nnz: {}", m.rows(), m.cols(), m.nnz());
    if let Some(text) = m.format_dense(10) {
        println!("{}", text);
    }

    // 2. Per-slice value groups.
    println!("2. Value groups per column:");
    for s in 0..m.outer_dim() {
        println!(
            "   column {}: {} unique over {} entries",
            s,
            m.unique_count(s).unwrap_or(0),
            m.slice_counts(s).map(|c| c.iter().sum::<usize>()).unwrap_or(0),
        );
    }
    println!();

    // 3. SpMV.
    println!("3. Multiplying by [1, 2, 3]...");
    let x = array![1.0, 2.0, 3.0];
    let y = m.matvec(&x.view())?;
    println!("   y = {:?}\n", y.to_vec());

    // 4. Transpose.
    println!("4. Transposing...");
    let t = m.transpose();
    println!(
        "   transposed shape: {}x{}, sum preserved: {}",
        t.rows(),
        t.cols(),
        t.sum() == m.sum()
    );
    println!();

    // 5. Scale in place.
    println!("5. Scaling by 2 in place...");
    let mut scaled = m.clone();
    scaled.scalar_multiply(2.0);
    println!("   sum: {} -> {}\n", m.sum(), scaled.sum());

    // 6. Pack into the compact level.
    println!("6. Packing into run encoding...");
    let packed = m.to_ivcsc();
    println!(
        "   payload bytes: {} (value-grouped) vs {} (packed)",
        m.byte_size(),
        packed.byte_size()
    );
    println!("   emissions identical: {}", packed.to_triplets() == m.to_triplets());

    Ok(())
}
