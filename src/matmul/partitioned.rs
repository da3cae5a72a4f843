//! Fork-join `C = A * B` over statically partitioned row ranges.
//!
//! The rows of C are split into `k` contiguous ranges (see
//! [`partition_rows_with`]). C's storage is cut along the same boundaries
//! with `split_at_mut`, so every task receives its own `&mut [f64]` block and
//! overlapping writes cannot be expressed. Each block is spawned as one task
//! inside a [`WorkerPool::scope`]; the scope returns only when every task has
//! resolved. `k` is independent of the pool size: more partitions than
//! workers simply queue, fewer leave workers idle.
//!
//! A task that fails, by returning a [`TaskError`] or by panicking, is logged
//! and does not increment the completion counter. Its block of C keeps
//! whatever it held before the call. The shortfall is reported through
//! [`Completion`] rather than as an error, so callers must check
//! [`Completion::is_complete`] before trusting C.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

use super::{check_shapes, compute_rows};
use crate::error::{Result, TaskError};
use crate::matrix::Matrix;
use crate::partition::{partition_rows_with, Partition, PartitionScheme};
use crate::pool::WorkerPool;

/// Computes one partition's block of C.
///
/// `out` holds rows `partition.lo..partition.hi` of C, row-major, with
/// `b.cols()` columns. Implementations must not assume `out` is zeroed.
pub trait RowKernel: Sync {
    fn compute(
        &self,
        a: &Matrix,
        b: &Matrix,
        partition: &Partition,
        out: &mut [f64],
    ) -> std::result::Result<(), TaskError>;
}

/// The row-restricted triple loop used by the sequential multiplier.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotKernel;

impl RowKernel for DotKernel {
    fn compute(
        &self,
        a: &Matrix,
        b: &Matrix,
        partition: &Partition,
        out: &mut [f64],
    ) -> std::result::Result<(), TaskError> {
        compute_rows(a, b, partition.lo, out);
        Ok(())
    }
}

/// How many partition tasks finished, out of how many were submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub completed: usize,
    pub expected: usize,
}

impl Completion {
    /// `true` when every partition finished and C is fully computed.
    pub fn is_complete(&self) -> bool {
        self.completed == self.expected
    }

    /// Number of partitions that did not finish.
    pub fn shortfall(&self) -> usize {
        self.expected - self.completed
    }
}

/// Computes `C = A * B` with `k` remainder-last partitions and [`DotKernel`].
pub fn multiply_partitioned(
    pool: &WorkerPool,
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    k: usize,
) -> Result<Completion> {
    multiply_partitioned_with(pool, a, b, c, k, PartitionScheme::RemainderLast, &DotKernel)
}

/// Computes `C = A * B` with `k` partitions laid out by `scheme`, running
/// `kernel` once per partition on `pool`.
///
/// Returns an error only for precondition violations (shape mismatch,
/// `k == 0`); in that case no task is spawned and `c` is untouched.
pub fn multiply_partitioned_with<K: RowKernel>(
    pool: &WorkerPool,
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    k: usize,
    scheme: PartitionScheme,
    kernel: &K,
) -> Result<Completion> {
    check_shapes(a, b, c)?;
    let partitions = partition_rows_with(a.rows(), k, scheme)?;
    let m = b.cols();

    debug!(
        n = a.rows(),
        partitions = k,
        workers = pool.num_threads(),
        ?scheme,
        "fork-join multiply"
    );

    let blocks = split_rows(c.as_mut_slice(), &partitions, m);
    let completed = AtomicUsize::new(0);

    pool.scope(|s| {
        for (partition, block) in partitions.iter().zip(blocks) {
            let completed = &completed;
            s.spawn(move |_| match run_task(kernel, a, b, partition, block) {
                Ok(()) => {
                    completed.fetch_add(1, Ordering::AcqRel);
                }
                Err(e) => {
                    warn!(lo = partition.lo, hi = partition.hi, "{}", e);
                }
            });
        }
    });

    let completion = Completion {
        completed: completed.into_inner(),
        expected: k,
    };
    if !completion.is_complete() {
        warn!(
            "Only {} of {} partitions completed",
            completion.completed, completion.expected
        );
    }
    Ok(completion)
}

/// Cuts `data` into consecutive blocks of `partition.len() * m` elements.
fn split_rows<'c>(
    mut data: &'c mut [f64],
    partitions: &[Partition],
    m: usize,
) -> Vec<&'c mut [f64]> {
    let mut blocks = Vec::with_capacity(partitions.len());
    for partition in partitions {
        let (block, rest) = std::mem::take(&mut data).split_at_mut(partition.len() * m);
        blocks.push(block);
        data = rest;
    }
    blocks
}

fn run_task<K: RowKernel>(
    kernel: &K,
    a: &Matrix,
    b: &Matrix,
    partition: &Partition,
    block: &mut [f64],
) -> std::result::Result<(), TaskError> {
    panic::catch_unwind(AssertUnwindSafe(|| kernel.compute(a, b, partition, block)))
        .unwrap_or_else(|payload| {
            Err(TaskError::Panicked {
                partition: partition.index,
                message: panic_message(payload.as_ref()),
            })
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatmulError;
    use crate::matmul::multiply_sequential;

    const SENTINEL: f64 = -1.0;

    /// Delegates to [`DotKernel`] except for one partition, which fails.
    struct FailOn {
        index: usize,
        panic: bool,
    }

    impl RowKernel for FailOn {
        fn compute(
            &self,
            a: &Matrix,
            b: &Matrix,
            partition: &Partition,
            out: &mut [f64],
        ) -> std::result::Result<(), TaskError> {
            if partition.index == self.index {
                if self.panic {
                    panic!("injected failure");
                }
                return Err(TaskError::Interrupted {
                    partition: partition.index,
                });
            }
            DotKernel.compute(a, b, partition, out)
        }
    }

    fn sentinel_matrix(rows: usize, cols: usize) -> Matrix {
        Matrix::from_rows(vec![vec![SENTINEL; cols]; rows]).unwrap()
    }

    fn run_matmul_test(n: usize, p: usize, m: usize, k: usize, threads: usize) {
        let pool = WorkerPool::new(threads).unwrap();
        let a = Matrix::filled(n, p);
        let b = Matrix::filled(p, m);
        let mut expected = Matrix::new(n, m);
        multiply_sequential(&a, &b, &mut expected).unwrap();

        for scheme in [PartitionScheme::RemainderLast, PartitionScheme::Balanced] {
            let mut c = sentinel_matrix(n, m);
            let completion =
                multiply_partitioned_with(&pool, &a, &b, &mut c, k, scheme, &DotKernel).unwrap();
            assert_eq!(
                completion,
                Completion {
                    completed: k,
                    expected: k
                }
            );
            assert_eq!(
                c, expected,
                "n={}, k={}, threads={}, {:?}",
                n, k, threads, scheme
            );
        }
    }

    #[test]
    fn test_fewer_partitions_than_rows() {
        run_matmul_test(37, 11, 13, 5, 2);
    }

    #[test]
    fn test_partitions_exceed_workers() {
        run_matmul_test(40, 8, 8, 16, 1);
    }

    #[test]
    fn test_single_partition() {
        run_matmul_test(9, 4, 6, 1, 3);
    }

    #[test]
    fn test_partitions_equal_rows() {
        run_matmul_test(12, 5, 5, 12, 4);
    }

    #[test]
    fn test_more_partitions_than_rows() {
        run_matmul_test(4, 6, 3, 100, 2);
    }

    #[test]
    fn test_default_entry_point() {
        let pool = WorkerPool::new(2).unwrap();
        let a = Matrix::filled(10, 4);
        let b = Matrix::filled(4, 7);
        let mut c = Matrix::new(10, 7);
        let completion = multiply_partitioned(&pool, &a, &b, &mut c, 16).unwrap();
        assert!(completion.is_complete());
        assert_eq!(completion.shortfall(), 0);
    }

    #[test]
    fn test_interrupted_partition_is_counted_and_left_untouched() {
        let pool = WorkerPool::new(2).unwrap();
        let (n, p, m, k) = (10, 3, 4, 5);
        let a = Matrix::filled(n, p);
        let b = Matrix::filled(p, m);
        let mut expected = Matrix::new(n, m);
        multiply_sequential(&a, &b, &mut expected).unwrap();

        let mut c = sentinel_matrix(n, m);
        let kernel = FailOn {
            index: 2,
            panic: false,
        };
        let completion = multiply_partitioned_with(
            &pool,
            &a,
            &b,
            &mut c,
            k,
            PartitionScheme::RemainderLast,
            &kernel,
        )
        .unwrap();

        assert_eq!(
            completion,
            Completion {
                completed: 4,
                expected: 5
            }
        );
        assert!(!completion.is_complete());
        assert_eq!(completion.shortfall(), 1);

        // Partition 2 covers rows 4..6.
        for i in 0..n {
            for j in 0..m {
                if (4..6).contains(&i) {
                    assert_eq!(c[(i, j)], SENTINEL);
                } else {
                    assert_eq!(c[(i, j)], expected[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn test_panicking_partition_is_absorbed() {
        let pool = WorkerPool::new(3).unwrap();
        let a = Matrix::filled(8, 8);
        let b = Matrix::filled(8, 8);
        let mut c = Matrix::new(8, 8);
        let kernel = FailOn {
            index: 0,
            panic: true,
        };

        let completion =
            multiply_partitioned_with(&pool, &a, &b, &mut c, 4, PartitionScheme::Balanced, &kernel)
                .unwrap();
        assert_eq!(completion.completed, 3);
        assert_eq!(completion.expected, 4);
    }

    #[test]
    fn test_zero_partitions_rejected() {
        let pool = WorkerPool::new(1).unwrap();
        let a = Matrix::filled(2, 2);
        let b = Matrix::filled(2, 2);
        let mut c = Matrix::new(2, 2);
        let err = multiply_partitioned(&pool, &a, &b, &mut c, 0).unwrap_err();
        assert_eq!(err, MatmulError::InvalidPartitionCount);
    }

    #[test]
    fn test_dimension_mismatch_spawns_nothing() {
        let pool = WorkerPool::new(1).unwrap();
        let a = Matrix::filled(3, 2);
        let b = Matrix::filled(3, 2);
        let mut c = sentinel_matrix(3, 2);
        let err = multiply_partitioned(&pool, &a, &b, &mut c, 2).unwrap_err();
        assert!(matches!(err, MatmulError::DimensionMismatch { .. }));
        assert_eq!(c, sentinel_matrix(3, 2));
    }

    #[test]
    fn test_split_rows_block_sizes() {
        let mut data = vec![0.0; 10 * 3];
        let partitions = crate::partition::partition_rows(10, 4).unwrap();
        let blocks = split_rows(&mut data, &partitions, 3);
        let lens: Vec<usize> = blocks.iter().map(|b| b.len()).collect();
        assert_eq!(lens, vec![6, 6, 6, 12]);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
