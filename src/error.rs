//! Error types for parmul operations.
//!
//! Precondition violations (shape mismatches, bad configuration) surface as
//! [`MatmulError`] and propagate with `?`. Failures of individual fork-join
//! tasks are [`TaskError`]s; they never leave the partitioned multiplier and
//! are folded into its completion count instead.

use thiserror::Error;

/// Errors that can occur during parmul operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatmulError {
    /// Two matrices do not have the shapes an operation requires.
    #[error("Dimension mismatch in {context}: {left:?} vs {right:?}")]
    DimensionMismatch {
        /// The operation that rejected its operands.
        context: &'static str,
        /// Shape `(rows, cols)` of the left-hand operand.
        left: (usize, usize),
        /// Shape `(rows, cols)` of the right-hand operand.
        right: (usize, usize),
    },
    /// A fork-join decomposition was requested with zero partitions.
    #[error("Invalid partition count: at least one partition is required")]
    InvalidPartitionCount,
    /// Rows supplied to [`Matrix::from_rows`](crate::matrix::Matrix::from_rows)
    /// have different lengths.
    #[error("Ragged rows: row {row} has {found} columns, expected {expected}")]
    RaggedRows {
        /// Index of the first offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// Input validation error.
    #[error("Validation error: {message}")]
    ValidationError {
        /// Human-readable error message.
        message: String,
    },
    /// The worker pool could not be created.
    #[error("Thread pool error: {message}")]
    ThreadPool {
        /// Message reported by the pool builder.
        message: String,
    },
}

/// Failure of a single fork-join partition task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The task stopped before finishing its rows.
    #[error("partition {partition} was interrupted")]
    Interrupted {
        /// Index of the partition that did not complete.
        partition: usize,
    },
    /// The task panicked; the panic was caught at the task boundary.
    #[error("partition {partition} panicked: {message}")]
    Panicked {
        /// Index of the partition that did not complete.
        partition: usize,
        /// Panic payload, when it was a string.
        message: String,
    },
}

/// Result type alias for parmul operations.
pub type Result<T> = std::result::Result<T, MatmulError>;

/// Creates a dimension mismatch error.
pub fn dimension_mismatch(
    context: &'static str,
    left: (usize, usize),
    right: (usize, usize),
) -> MatmulError {
    MatmulError::DimensionMismatch {
        context,
        left,
        right,
    }
}

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> MatmulError {
    MatmulError::ValidationError {
        message: message.into(),
    }
}
