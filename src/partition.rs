//! Static row partitioning for the fork-join multiplier.
//!
//! A partitioning of `n` rows into `k` parts is always exactly `k` half-open
//! ranges that are ordered, contiguous, pairwise disjoint and cover `[0, n)`.
//! Ranges may be empty when `k > n`. Boundaries depend only on `(n, k)` and
//! the scheme, never on scheduling.

use std::ops::Range;

use crate::error::{MatmulError, Result};

/// How leftover rows are distributed when `k` does not divide `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartitionScheme {
    /// Every range has `n / k` rows except the last, which takes the
    /// remainder: `n - (k - 1) * (n / k)` rows.
    #[default]
    RemainderLast,
    /// The first `n % k` ranges get one extra row each.
    Balanced,
}

/// A half-open row range `[lo, hi)` assigned to one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Position of this range in the partitioning, `0..k`.
    pub index: usize,
    pub lo: usize,
    pub hi: usize,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    pub fn is_empty(&self) -> bool {
        self.lo == self.hi
    }

    pub fn rows(&self) -> Range<usize> {
        self.lo..self.hi
    }
}

/// Splits `[0, n)` into `k` ranges using [`PartitionScheme::RemainderLast`].
pub fn partition_rows(n: usize, k: usize) -> Result<Vec<Partition>> {
    partition_rows_with(n, k, PartitionScheme::RemainderLast)
}

/// Splits `[0, n)` into `k` ranges using `scheme`.
///
/// Returns [`MatmulError::InvalidPartitionCount`] when `k == 0`.
pub fn partition_rows_with(n: usize, k: usize, scheme: PartitionScheme) -> Result<Vec<Partition>> {
    if k == 0 {
        return Err(MatmulError::InvalidPartitionCount);
    }

    let base = n / k;
    let extra = n % k;

    let mut partitions = Vec::with_capacity(k);
    let mut lo = 0;
    for index in 0..k {
        let len = match scheme {
            PartitionScheme::RemainderLast if index == k - 1 => n - lo,
            PartitionScheme::RemainderLast => base,
            PartitionScheme::Balanced => base + usize::from(index < extra),
        };
        partitions.push(Partition {
            index,
            lo,
            hi: lo + len,
        });
        lo += len;
    }

    debug_assert_eq!(lo, n);
    Ok(partitions)
}
