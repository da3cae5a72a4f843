//! # Dense Matrix Multiplication Strategies
//!
//! Three interchangeable ways to compute `C = A * B` for row-major `f64`
//! matrices, A (`n x p`), B (`p x m`), C (`n x m`):
//!
//! 1.  [`multiply_sequential`]: the single-threaded reference triple loop.
//! 2.  [`multiply_data_parallel`]: rows (and optionally columns within each
//!     row) distributed dynamically by Rayon's work-stealing scheduler.
//! 3.  [`multiply_partitioned`]: rows split statically into `k` contiguous
//!     ranges, each run as its own task on the worker pool, with a completion
//!     counter aggregated at the end.
//!
//! Every strategy computes each cell as `Σ_k A[i][k] * B[k][j]`, accumulated
//! in ascending `k` from `0.0`, so for identical inputs the strategies only
//! differ in which thread computes which cell.
//!
//! All entry points validate shapes before touching C and return
//! [`MatmulError::DimensionMismatch`] on violation.

pub mod data_parallel;
pub mod partitioned;
pub mod sequential;

pub use data_parallel::{multiply_data_parallel, Nesting};
pub use partitioned::{
    multiply_partitioned, multiply_partitioned_with, Completion, DotKernel, RowKernel,
};
pub use sequential::multiply_sequential;

use crate::error::{dimension_mismatch, Result};
use crate::matrix::Matrix;

/// Checks `A.cols == B.rows`, `C.rows == A.rows` and `C.cols == B.cols`.
pub(crate) fn check_shapes(a: &Matrix, b: &Matrix, c: &Matrix) -> Result<()> {
    if a.cols() != b.rows() {
        return Err(dimension_mismatch(
            "A * B (inner dimension)",
            a.shape(),
            b.shape(),
        ));
    }
    if c.shape() != (a.rows(), b.cols()) {
        return Err(dimension_mismatch(
            "C = A * B (output shape)",
            c.shape(),
            (a.rows(), b.cols()),
        ));
    }
    Ok(())
}

/// `Σ_k a_row[k] * B[k][j]`.
#[inline]
pub(crate) fn dot_column(a_row: &[f64], b: &Matrix, j: usize) -> f64 {
    let m = b.cols();
    let b_data = b.as_slice();
    let mut sum = 0.0;
    for (k, &a_ik) in a_row.iter().enumerate() {
        sum += a_ik * b_data[k * m + j];
    }
    sum
}

/// Computes rows `first_row..first_row + out.len() / m` of `A * B` into `out`.
///
/// `out` must be exactly that block of C, row-major with `B.cols()` columns.
pub(crate) fn compute_rows(a: &Matrix, b: &Matrix, first_row: usize, out: &mut [f64]) {
    let m = b.cols();
    if m == 0 {
        return;
    }

    for (offset, c_row) in out.chunks_mut(m).enumerate() {
        let a_row = a.row(first_row + offset);
        for (j, cell) in c_row.iter_mut().enumerate() {
            *cell = dot_column(a_row, b, j);
        }
    }
}

/// Total floating-point operations for an `n x p` by `p x m` product: one
/// multiply and one add per inner-loop step.
pub fn operation_count(n: usize, p: usize, m: usize) -> u64 {
    2 * (n as u64) * (p as u64) * (m as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatmulError;

    #[test]
    fn test_operation_count() {
        assert_eq!(operation_count(10, 20, 30), 12_000);
        assert_eq!(operation_count(1, 1, 1), 2);
        assert_eq!(operation_count(0, 5, 5), 0);
    }

    #[test]
    fn test_operation_count_does_not_overflow_usize_products() {
        assert_eq!(
            operation_count(100_000, 100_000, 100_000),
            2_000_000_000_000_000
        );
    }

    #[test]
    fn test_check_shapes_inner_dimension() {
        let a = Matrix::new(2, 3);
        let b = Matrix::new(4, 2);
        let c = Matrix::new(2, 2);
        assert!(matches!(
            check_shapes(&a, &b, &c),
            Err(MatmulError::DimensionMismatch {
                left: (2, 3),
                right: (4, 2),
                ..
            })
        ));
    }

    #[test]
    fn test_check_shapes_output() {
        let a = Matrix::new(2, 3);
        let b = Matrix::new(3, 4);
        assert!(check_shapes(&a, &b, &Matrix::new(2, 4)).is_ok());
        assert!(check_shapes(&a, &b, &Matrix::new(4, 2)).is_err());
    }

    #[test]
    fn test_dot_column() {
        let b = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(dot_column(&[1.0, 1.0, 1.0], &b, 0), 9.0);
        assert_eq!(dot_column(&[1.0, 0.0, 2.0], &b, 1), 14.0);
    }

    #[test]
    fn test_compute_rows_block() {
        let a = Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![2.0, 2.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let mut out = vec![0.0; 4];
        compute_rows(&a, &b, 1, &mut out);
        assert_eq!(out, vec![3.0, 4.0, 8.0, 12.0]);
    }
}
