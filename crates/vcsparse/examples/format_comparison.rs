//! Storage Level Comparison Example
//!
//! Measures how the three storage levels trade space against value
//! redundancy, and shows the redundancy-driven format recommendation.
//!
//! Run with: cargo run --example format_comparison

use vcsparse::utils::{recommend_format, RedundancyStats};
use vcsparse::{Orientation, SparseMatrix, VcscMatrix};

/// Build an n x n matrix where each column draws from `vocabulary` values
fn build_matrix(n: usize, vocabulary: usize) -> VcscMatrix<f64> {
    let mut triplets = Vec::new();
    for col in 0..n {
        for row in (col % 3..n).step_by(3) {
            let value = ((row + col) % vocabulary + 1) as f64;
            triplets.push((row, col, value));
        }
    }
    VcscMatrix::from_coo(&triplets, n, n, Orientation::ColumnMajor).expect("valid triplets")
}

fn main() -> anyhow::Result<()> {
    println!("=== vcsparse: Storage Level Comparison ===\n");

    for &vocabulary in &[1usize, 4, 64] {
        let m = build_matrix(96, vocabulary);
        let csc = m.to_csc();
        let packed = m.to_ivcsc();

        let stats = RedundancyStats::from_vcsc(&m);
        println!(
            "vocabulary of {:>2} values: nnz = {}, redundancy = {:.2}",
            vocabulary, stats.nnz, stats.redundancy
        );
        println!(
            "   payload bytes: CSC {:>6}  VCSC {:>6}  IVCSC {:>6}",
            csc.byte_size(),
            m.byte_size(),
            packed.byte_size()
        );
        println!("   recommended: {:?}\n", recommend_format(&stats));
    }

    Ok(())
}
