//! Redundancy analysis and storage-format selection
//!
//! The value-compressed levels pay off exactly when slices repeat values:
//! the redundancy of a matrix is `1 - unique_values / nnz`, aggregated over
//! its slices. This module measures that ratio and turns it into a format
//! recommendation.
//!
//! # Examples
//!
//! ```
//! use vcsparse::utils::{recommend_format, FormatRecommendation, RedundancyStats};
//! use vcsparse::{Orientation, VcscMatrix};
//!
//! let m = VcscMatrix::from_coo(
//!     &[(0, 0, 5.0), (1, 0, 5.0), (2, 0, 5.0), (3, 0, 5.0)],
//!     4,
//!     1,
//!     Orientation::ColumnMajor,
//! )
//! .unwrap();
//!
//! let stats = RedundancyStats::from_vcsc(&m);
//! assert_eq!(stats.unique_total, 1);
//! assert_eq!(recommend_format(&stats), FormatRecommendation::Ivcsc);
//! ```

use crate::ivcsc::IvcscMatrix;
use crate::matrix::SparseMatrix;
use crate::value::SparseValue;
use crate::vcsc::VcscMatrix;

/// Value-redundancy statistics for a matrix
#[derive(Debug, Clone)]
pub struct RedundancyStats {
    /// Number of stored entries
    pub nnz: usize,
    /// Sum of unique-value counts over all slices
    pub unique_total: usize,
    /// Number of outer slices
    pub slice_count: usize,
    /// Aggregate redundancy `1 - unique_total / nnz` (0 when empty)
    pub redundancy: f64,
}

impl RedundancyStats {
    fn new(nnz: usize, unique_total: usize, slice_count: usize) -> Self {
        let redundancy = if nnz > 0 {
            1.0 - unique_total as f64 / nnz as f64
        } else {
            0.0
        };
        Self {
            nnz,
            unique_total,
            slice_count,
            redundancy,
        }
    }

    /// Measure a value-grouped matrix
    pub fn from_vcsc<T: SparseValue>(matrix: &VcscMatrix<T>) -> Self {
        let slice_count = matrix.outer_dim();
        let unique_total = (0..slice_count)
            .map(|s| matrix.unique_count(s).unwrap_or(0))
            .sum();
        Self::new(matrix.nnz(), unique_total, slice_count)
    }

    /// Measure a packed matrix by counting run starts
    pub fn from_ivcsc<T: SparseValue>(matrix: &IvcscMatrix<T>) -> Self {
        let slice_count = matrix.outer_dim();
        let mut unique_total = 0;
        for s in 0..slice_count {
            if let Some(iter) = matrix.iter_slice(s) {
                unique_total += iter.filter(|entry| entry.new_run).count();
            }
        }
        Self::new(matrix.nnz(), unique_total, slice_count)
    }
}

/// Storage level recommended for a measured matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRecommendation {
    /// Baseline CSC: redundancy too low to pay for grouping
    Csc,
    /// Value-grouped storage: moderate redundancy, random access kept
    Vcsc,
    /// Packed runs: high redundancy, iterator access only
    Ivcsc,
}

/// Recommend a storage level from redundancy statistics
///
/// Thresholds follow the crossover behavior of the formats: grouping starts
/// paying around one third redundancy, packing dominates once slices hold
/// few distinct values.
pub fn recommend_format(stats: &RedundancyStats) -> FormatRecommendation {
    if stats.nnz == 0 || stats.redundancy < 0.3 {
        FormatRecommendation::Csc
    } else if stats.redundancy < 0.7 {
        FormatRecommendation::Vcsc
    } else {
        FormatRecommendation::Ivcsc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Orientation;

    #[test]
    fn test_stats_redundant_matrix() {
        let m = VcscMatrix::from_coo(
            &[(0, 0, 5.0), (2, 0, 5.0), (3, 0, 5.0), (4, 0, 9.0)],
            6,
            1,
            Orientation::ColumnMajor,
        )
        .unwrap();

        let stats = RedundancyStats::from_vcsc(&m);
        assert_eq!(stats.nnz, 4);
        assert_eq!(stats.unique_total, 2);
        assert_eq!(stats.slice_count, 1);
        assert!((stats.redundancy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_stats_agree_across_levels() {
        let triplets = [
            (0, 0, 1.0),
            (1, 0, 1.0),
            (2, 1, 2.0),
            (3, 1, 2.0),
            (4, 1, 3.0),
        ];
        let vcsc = VcscMatrix::from_coo(&triplets, 5, 2, Orientation::ColumnMajor).unwrap();
        let ivcsc = vcsc.to_ivcsc();

        let a = RedundancyStats::from_vcsc(&vcsc);
        let b = RedundancyStats::from_ivcsc(&ivcsc);
        assert_eq!(a.nnz, b.nnz);
        assert_eq!(a.unique_total, b.unique_total);
        assert_eq!(a.redundancy, b.redundancy);
    }

    #[test]
    fn test_stats_empty() {
        let m = VcscMatrix::<f64>::from_coo(&[], 4, 4, Orientation::ColumnMajor).unwrap();
        let stats = RedundancyStats::from_vcsc(&m);
        assert_eq!(stats.redundancy, 0.0);
        assert_eq!(recommend_format(&stats), FormatRecommendation::Csc);
    }

    #[test]
    fn test_recommendation_thresholds() {
        // All values distinct: no redundancy.
        let distinct = VcscMatrix::from_coo(
            &[(0, 0, 1.0), (1, 0, 2.0), (2, 0, 3.0)],
            3,
            1,
            Orientation::ColumnMajor,
        )
        .unwrap();
        assert_eq!(
            recommend_format(&RedundancyStats::from_vcsc(&distinct)),
            FormatRecommendation::Csc
        );

        // Half redundant.
        let half = VcscMatrix::from_coo(
            &[(0, 0, 1.0), (1, 0, 1.0), (2, 0, 2.0), (3, 0, 2.0)],
            4,
            1,
            Orientation::ColumnMajor,
        )
        .unwrap();
        assert_eq!(
            recommend_format(&RedundancyStats::from_vcsc(&half)),
            FormatRecommendation::Vcsc
        );

        // One value everywhere.
        let uniform = VcscMatrix::from_coo(
            &[(0, 0, 1.0), (1, 0, 1.0), (2, 0, 1.0), (3, 0, 1.0)],
            4,
            1,
            Orientation::ColumnMajor,
        )
        .unwrap();
        assert_eq!(
            recommend_format(&RedundancyStats::from_vcsc(&uniform)),
            FormatRecommendation::Ivcsc
        );
    }
}
