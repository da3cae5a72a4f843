//! Deterministic matrix population.
//!
//! Every cell is a pure function of its indices, so all strategies see the
//! same inputs without a random number generator.

use crate::matrix::Matrix;
use crate::{COL_SCALE, ROW_SCALE};

/// The value [`fill`] stores at `(i, j)`: `i * 1e-3 + j * 1e-6`.
#[inline]
pub fn fill_value(i: usize, j: usize) -> f64 {
    (i as f64) * ROW_SCALE + (j as f64) * COL_SCALE
}

/// Overwrites every cell of `matrix` with [`fill_value`].
pub fn fill(matrix: &mut Matrix) {
    let cols = matrix.cols();
    if cols == 0 {
        return;
    }

    matrix
        .as_mut_slice()
        .chunks_mut(cols)
        .enumerate()
        .for_each(|(i, row)| {
            row.iter_mut()
                .enumerate()
                .for_each(|(j, cell)| *cell = fill_value(i, j));
        });
}
