//! Benchmark harness: times the three strategies on identical inputs and
//! cross-checks their results.
//!
//! A [`Benchmark`] owns its configuration and the [`RowKernel`] used by the
//! fork-join strategy. [`Benchmark::run`] acquires a [`WorkerPool`], runs
//! sequential, data-parallel and partitioned multiplication in that order,
//! and releases the pool before returning on every path. Verification and
//! partition shortfalls are advisory: they end up in the [`BenchReport`] and
//! the log, never in an `Err`.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::info;

use crate::config::BenchConfig;
use crate::error::Result;
use crate::matmul::{
    multiply_data_parallel, multiply_partitioned_with, multiply_sequential, operation_count,
    Completion, DotKernel, RowKernel,
};
use crate::matrix::Matrix;
use crate::pool::WorkerPool;
use crate::verify::sum_squared_difference;

/// Timing of one strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyRun {
    /// Short tag used in the report: `Seq`, `Par` or `Frk`.
    pub label: &'static str,
    pub elapsed: Duration,
    /// Floating-point operations performed, `2 * n * p * m`.
    pub ops: u64,
}

impl StrategyRun {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1.0e3
    }

    /// Millions of floating-point operations per second. Infinite when the
    /// run was too fast for the clock.
    pub fn mflops(&self) -> f64 {
        ratio(self.ops as f64, self.elapsed.as_secs_f64()) * 1.0e-6
    }
}

/// `elapsed(reference) / elapsed(other)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speedup {
    pub label: &'static str,
    pub ratio: f64,
}

/// Sum of squared differences between the sequential result and another one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verification {
    pub label: &'static str,
    pub sum_squared: f64,
}

/// Everything one benchmark run measured, printed through `Display`.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub started_at: DateTime<Local>,
    pub config: BenchConfig,
    /// Threads in the worker pool the parallel strategies ran on.
    pub workers: usize,
    pub sequential: StrategyRun,
    pub data_parallel: StrategyRun,
    pub partitioned: StrategyRun,
    /// Completion count of the fork-join strategy.
    pub completion: Completion,
    pub speedups: Vec<Speedup>,
    pub verification: Vec<Verification>,
}

impl BenchReport {
    pub fn speedup(&self, label: &str) -> Option<f64> {
        self.speedups
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.ratio)
    }

    pub fn sum_squared(&self, label: &str) -> Option<f64> {
        self.verification
            .iter()
            .find(|v| v.label == label)
            .map(|v| v.sum_squared)
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.config;
        writeln!(
            f,
            "parmul {}: C({n},{m}) = A({n},{p}) * B({p},{m})",
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            n = c.n,
            p = c.p,
            m = c.m
        )?;
        writeln!(f)?;
        write_run(f, &self.sequential)?;
        write_run(f, &self.data_parallel)?;
        writeln!(f, "Num proc = {}", self.workers)?;
        write_run(f, &self.partitioned)?;
        if !self.completion.is_complete() {
            writeln!(
                f,
                "\nOnly {} of {} partitions completed.\n",
                self.completion.completed, self.completion.expected
            )?;
        }
        writeln!(f)?;
        for s in &self.speedups {
            writeln!(f, "Speedup {} = {:.6}", s.label, s.ratio)?;
        }
        writeln!(f)?;
        for v in &self.verification {
            writeln!(f, "SumSq   {} = {:e}", v.label, v.sum_squared)?;
        }
        Ok(())
    }
}

fn write_run(f: &mut fmt::Formatter<'_>, run: &StrategyRun) -> fmt::Result {
    writeln!(
        f,
        "{}: {} add/mul in {:.6} milliseconds ({:.3} Mflops)",
        run.label,
        run.ops,
        run.elapsed_ms(),
        run.mflops()
    )
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        f64::INFINITY
    }
}

fn timed<T>(
    label: &'static str,
    ops: u64,
    f: impl FnOnce() -> Result<T>,
) -> Result<(StrategyRun, T)> {
    let start = Instant::now();
    let value = f()?;
    let run = StrategyRun {
        label,
        elapsed: start.elapsed(),
        ops,
    };
    info!(
        strategy = label,
        ms = run.elapsed_ms(),
        mflops = run.mflops(),
        "strategy finished"
    );
    Ok((run, value))
}

/// Runs the three strategies on one configuration and reports on them.
pub struct Benchmark<K: RowKernel = DotKernel> {
    config: BenchConfig,
    kernel: K,
}

impl Benchmark<DotKernel> {
    pub fn new(config: BenchConfig) -> Self {
        Benchmark {
            config,
            kernel: DotKernel,
        }
    }
}

impl<K: RowKernel> Benchmark<K> {
    /// Replaces the kernel the fork-join strategy runs per partition.
    pub fn with_kernel<K2: RowKernel>(self, kernel: K2) -> Benchmark<K2> {
        Benchmark {
            config: self.config,
            kernel,
        }
    }

    /// Runs all three strategies and builds the report.
    ///
    /// Fails only on invalid configuration or if the worker pool cannot be
    /// built.
    pub fn run(&self) -> Result<BenchReport> {
        self.config.validate()?;
        let pool = WorkerPool::new(self.config.threads)?;
        self.measure(&pool)
    }

    /// Same as [`run`](Self::run) on a caller-owned pool. The configured
    /// thread count is ignored.
    pub fn run_on(&self, pool: &WorkerPool) -> Result<BenchReport> {
        self.config.validate()?;
        self.measure(pool)
    }

    fn measure(&self, pool: &WorkerPool) -> Result<BenchReport> {
        let started_at = Local::now();
        let BenchConfig { n, p, m, .. } = self.config;
        let ops = operation_count(n, p, m);

        info!(
            n,
            p,
            m,
            ops,
            workers = pool.num_threads(),
            "benchmark started"
        );

        let a = Matrix::filled(n, p);
        let b = Matrix::filled(p, m);
        let mut c_seq = Matrix::new(n, m);
        let mut c_par = Matrix::new(n, m);
        let mut c_frk = Matrix::new(n, m);

        let (sequential, ()) = timed("Seq", ops, || multiply_sequential(&a, &b, &mut c_seq))?;

        let (data_parallel, ()) = timed("Par", ops, || {
            multiply_data_parallel(pool, &a, &b, &mut c_par, self.config.nesting)
        })?;

        let (partitioned, completion) = timed("Frk", ops, || {
            multiply_partitioned_with(
                pool,
                &a,
                &b,
                &mut c_frk,
                self.config.partitions,
                self.config.scheme,
                &self.kernel,
            )
        })?;

        let seq_secs = sequential.elapsed.as_secs_f64();
        let par_secs = data_parallel.elapsed.as_secs_f64();
        let frk_secs = partitioned.elapsed.as_secs_f64();
        let speedups = vec![
            Speedup {
                label: "s->p",
                ratio: ratio(seq_secs, par_secs),
            },
            Speedup {
                label: "s->f",
                ratio: ratio(seq_secs, frk_secs),
            },
            Speedup {
                label: "p->f",
                ratio: ratio(par_secs, frk_secs),
            },
        ];

        let verification = vec![
            Verification {
                label: "s->p",
                sum_squared: sum_squared_difference(&c_seq, &c_par)?,
            },
            Verification {
                label: "s->f",
                sum_squared: sum_squared_difference(&c_seq, &c_frk)?,
            },
        ];

        Ok(BenchReport {
            started_at,
            config: self.config.clone(),
            workers: pool.num_threads(),
            sequential,
            data_parallel,
            partitioned,
            completion,
            speedups,
            verification,
        })
    }
}
