//! Dense `f64` matrix multiplication with three execution strategies and a
//! harness that times them against each other.
//!
//! ```
//! use parmul::matmul::{multiply_partitioned, multiply_sequential};
//! use parmul::{Matrix, WorkerPool};
//!
//! let a = Matrix::filled(64, 32);
//! let b = Matrix::filled(32, 48);
//! let mut expected = Matrix::new(64, 48);
//! let mut c = Matrix::new(64, 48);
//!
//! multiply_sequential(&a, &b, &mut expected)?;
//!
//! let pool = WorkerPool::new(4)?;
//! let completion = multiply_partitioned(&pool, &a, &b, &mut c, 16)?;
//! assert!(completion.is_complete());
//! assert_eq!(parmul::sum_squared_difference(&expected, &c)?, 0.0);
//! # Ok::<(), parmul::MatmulError>(())
//! ```

pub mod bench;
pub mod config;
pub mod error;
pub mod fill;
pub mod logging;
pub mod matmul;
pub mod matrix;
pub mod partition;
pub mod pool;
pub mod verify;

pub use bench::{BenchReport, Benchmark};
pub use config::BenchConfig;
pub use error::{MatmulError, Result, TaskError};
pub use matrix::Matrix;
pub use pool::WorkerPool;
pub use verify::sum_squared_difference;

/// Row-index weight of [`fill::fill_value`].
pub const ROW_SCALE: f64 = 1.0e-3;
/// Column-index weight of [`fill::fill_value`].
pub const COL_SCALE: f64 = 1.0e-6;

/// Fork-join partition count used when none is given.
pub const DEFAULT_PARTITIONS: usize = 16;
