//! Cross-checking of results produced by different strategies.

use crate::error::{dimension_mismatch, Result};
use crate::matrix::Matrix;

/// Sum over all cells of `(x[i][j] - y[i][j])²`.
///
/// Two strategies that accumulate in different orders may disagree by more
/// than machine epsilon for large inner dimensions, so callers should compare
/// the result against a tolerance rather than expect exactly `0.0`.
pub fn sum_squared_difference(x: &Matrix, y: &Matrix) -> Result<f64> {
    if x.shape() != y.shape() {
        return Err(dimension_mismatch("verify", x.shape(), y.shape()));
    }

    Ok(x.as_slice()
        .iter()
        .zip(y.as_slice())
        .map(|(a, b)| {
            let d = a - b;
            d * d
        })
        .sum())
}
