use tracing::trace;

use super::{check_shapes, compute_rows};
use crate::error::Result;
use crate::matrix::Matrix;

/// Computes `C = A * B` on the calling thread.
///
/// Loops run row, then column, then reduction. Every cell of `c` is
/// overwritten, so `c` does not need to be zeroed beforehand.
///
/// # Arguments
///
/// * `a` - Matrix A (`n x p`).
/// * `b` - Matrix B (`p x m`).
/// * `c` - Output matrix C (`n x m`).
pub fn multiply_sequential(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
    check_shapes(a, b, c)?;
    trace!(
        n = a.rows(),
        p = a.cols(),
        m = b.cols(),
        "sequential multiply"
    );

    compute_rows(a, b, 0, c.as_mut_slice());
    Ok(())
}
