//! Data-parallel `C = A * B` using Rayon parallel iterators.
//!
//! Parallelism strategy:
//! - The loop over rows of C is a parallel iterator over `m`-element row
//!   chunks. Each task owns its row exclusively, so no locking is needed on C.
//! - With [`Nesting::Nested`] the loop over columns within a row is a second,
//!   nested parallel iterator. Each `(i, j)` task writes one cell.
//! - With [`Nesting::Flat`] the column loop is sequential within each row.
//!
//! Nesting two levels of parallel work on one bounded pool is safe here
//! because the pool is Rayon's work-stealing pool: a row task blocked on its
//! column tasks executes pending work (its own column tasks included) instead
//! of parking, so no worker ever waits on work that cannot be scheduled. A
//! fixed-size blocking pool would not give this guarantee. The tests exercise
//! both modes on a single-thread pool, where starvation would show up as a
//! hang.

use rayon::prelude::*;
use tracing::trace;

use super::{check_shapes, dot_column};
use crate::error::Result;
use crate::matrix::Matrix;
use crate::pool::WorkerPool;

/// Decomposition depth for [`multiply_data_parallel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nesting {
    /// Rows in parallel, and columns in parallel within each row.
    #[default]
    Nested,
    /// Rows in parallel, columns sequential within each row.
    Flat,
}

/// Computes `C = A * B` on `pool` with dynamically load-balanced tasks.
///
/// # Arguments
///
/// * `pool` - Worker pool the parallel iterators run on.
/// * `a` - Matrix A (`n x p`).
/// * `b` - Matrix B (`p x m`).
/// * `c` - Output matrix C (`n x m`); every cell is overwritten.
/// * `nesting` - Whether the column loop is parallel as well.
pub fn multiply_data_parallel(
    pool: &WorkerPool,
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    nesting: Nesting,
) -> Result<()> {
    check_shapes(a, b, c)?;
    let m = b.cols();
    if m == 0 {
        return Ok(());
    }
    trace!(n = a.rows(), p = a.cols(), m, ?nesting, "data-parallel multiply");

    let c_data = c.as_mut_slice();
    pool.install(|| match nesting {
        Nesting::Nested => {
            c_data
                .par_chunks_mut(m)
                .enumerate()
                .for_each(|(i, c_row)| {
                    let a_row = a.row(i);
                    c_row
                        .par_iter_mut()
                        .enumerate()
                        .for_each(|(j, cell)| *cell = dot_column(a_row, b, j));
                });
        }
        Nesting::Flat => {
            c_data
                .par_chunks_mut(m)
                .enumerate()
                .for_each(|(i, c_row)| {
                    let a_row = a.row(i);
                    for (j, cell) in c_row.iter_mut().enumerate() {
                        *cell = dot_column(a_row, b, j);
                    }
                });
        }
    });

    Ok(())
}
