//! The worker pool shared by the parallel multipliers.
//!
//! A [`WorkerPool`] owns a dedicated `rayon::ThreadPool`. It is created once
//! per benchmark run and passed by reference to every multiplier that needs
//! it; its threads are shut down when the pool is dropped. Nothing in this
//! crate touches Rayon's global pool.

use rayon::ThreadPool;
use tracing::debug;

use crate::error::{validation_error, MatmulError, Result};

/// A fixed-size Rayon thread pool owned by one benchmark run.
#[derive(Debug)]
pub struct WorkerPool {
    inner: ThreadPool,
}

impl WorkerPool {
    /// Builds a pool with `num_threads` workers named `parmul-worker-{i}`.
    pub fn new(num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(validation_error("worker pool needs at least one thread"));
        }

        let inner = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("parmul-worker-{}", i))
            .build()
            .map_err(|e| MatmulError::ThreadPool {
                message: e.to_string(),
            })?;

        debug!(threads = num_threads, "worker pool started");
        Ok(WorkerPool { inner })
    }

    /// Builds a pool sized to the number of logical CPUs.
    pub fn with_hardware_parallelism() -> Result<Self> {
        Self::new(num_cpus::get())
    }

    pub fn num_threads(&self) -> usize {
        self.inner.current_num_threads()
    }

    /// Runs `op` inside the pool; parallel iterators used by `op` execute on
    /// this pool's workers.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.inner.install(op)
    }

    /// Opens a fork-join scope on this pool. Returns once every task spawned
    /// in the scope has finished.
    pub fn scope<'scope, OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce(&rayon::Scope<'scope>) -> R + Send,
        R: Send,
    {
        self.inner.scope(op)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        debug!(threads = self.num_threads(), "worker pool shutting down");
    }
}
