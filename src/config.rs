//! Command-line arguments and benchmark configuration.

use clap::{ArgAction, Parser};

use crate::error::{validation_error, MatmulError, Result};
use crate::matmul::Nesting;
use crate::partition::PartitionScheme;
use crate::DEFAULT_PARTITIONS;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "parmul",
    about = "Times sequential, data-parallel and fork-join C = A * B"
)]
pub struct Args {
    #[arg(value_name = "N", help = "rows of A and C")]
    pub n: usize,

    #[arg(value_name = "P", help = "columns of A, rows of B")]
    pub p: usize,

    #[arg(value_name = "M", help = "columns of B and C")]
    pub m: usize,

    #[arg(
        short('k'),
        long,
        value_name = "K",
        default_value_t = DEFAULT_PARTITIONS,
        help = "number of row partitions for the fork-join strategy"
    )]
    pub partitions: usize,

    #[arg(
        short('t'),
        long,
        value_name = "THREADS",
        help = "worker pool size (defaults to the number of logical CPUs)"
    )]
    pub threads: Option<usize>,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "parallelize rows only in the data-parallel strategy"
    )]
    pub flat: bool,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "spread leftover rows over the first partitions instead of the last"
    )]
    pub balanced: bool,
}

/// Everything a [`Benchmark`](crate::bench::Benchmark) run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub n: usize,
    pub p: usize,
    pub m: usize,
    pub partitions: usize,
    pub threads: usize,
    pub nesting: Nesting,
    pub scheme: PartitionScheme,
}

impl BenchConfig {
    /// Default configuration for `A(n x p) * B(p x m)`.
    pub fn new(n: usize, p: usize, m: usize) -> Self {
        Self {
            n,
            p,
            m,
            partitions: DEFAULT_PARTITIONS,
            threads: num_cpus::get(),
            nesting: Nesting::default(),
            scheme: PartitionScheme::default(),
        }
    }

    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;

        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;

        self
    }

    pub fn with_nesting(mut self, nesting: Nesting) -> Self {
        self.nesting = nesting;

        self
    }

    pub fn with_scheme(mut self, scheme: PartitionScheme) -> Self {
        self.scheme = scheme;

        self
    }

    /// Rejects zero dimensions, zero partitions and an empty pool.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("n", self.n), ("p", self.p), ("m", self.m)] {
            if value == 0 {
                let message = format!("{} must be a positive integer", name);
                return Err(validation_error(message));
            }
        }
        if self.partitions == 0 {
            return Err(MatmulError::InvalidPartitionCount);
        }
        if self.threads == 0 {
            return Err(validation_error("threads must be a positive integer"));
        }
        Ok(())
    }
}

impl TryFrom<Args> for BenchConfig {
    type Error = MatmulError;

    fn try_from(args: Args) -> Result<Self> {
        let mut config = BenchConfig::new(args.n, args.p, args.m)
            .with_partitions(args.partitions)
            .with_threads(args.threads.unwrap_or_else(num_cpus::get));
        if args.flat {
            config = config.with_nesting(Nesting::Flat);
        }
        if args.balanced {
            config = config.with_scheme(PartitionScheme::Balanced);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(argv: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("parmul").chain(argv.iter().copied()))
    }

    #[test]
    fn test_positional_dimensions() {
        let args = parse(&["10", "20", "30"]).unwrap();
        assert_eq!((args.n, args.p, args.m), (10, 20, 30));
        assert_eq!(args.partitions, DEFAULT_PARTITIONS);
        assert_eq!(args.threads, None);
        assert!(!args.flat);
        assert!(!args.balanced);
    }

    #[test]
    fn test_wrong_argument_count() {
        let err = parse(&["10", "20"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        assert!(parse(&["10", "20", "30", "40"]).is_err());
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_non_numeric_dimension() {
        let err = parse(&["10", "abc", "30"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_options() {
        let args = parse(&["4", "4", "4", "-k", "100", "--threads", "2"]).unwrap();
        let config = BenchConfig::try_from(args).unwrap();
        assert_eq!(config.partitions, 100);
        assert_eq!(config.threads, 2);
        assert_eq!(config.nesting, Nesting::Nested);
        assert_eq!(config.scheme, PartitionScheme::RemainderLast);
    }

    #[test]
    fn test_strategy_flags() {
        let args = parse(&["4", "4", "4", "--flat", "--balanced"]).unwrap();
        let config = BenchConfig::try_from(args).unwrap();
        assert_eq!(config.nesting, Nesting::Flat);
        assert_eq!(config.scheme, PartitionScheme::Balanced);
    }

    #[test]
    fn test_defaults() {
        let config = BenchConfig::try_from(parse(&["1", "2", "3"]).unwrap()).unwrap();
        assert_eq!(config, BenchConfig::new(1, 2, 3));
        assert_eq!(config.nesting, Nesting::Nested);
        assert_eq!(config.scheme, PartitionScheme::RemainderLast);
        assert!(config.threads >= 1);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = BenchConfig::try_from(parse(&["3", "0", "3"]).unwrap()).unwrap_err();
        assert!(format!("{}", err).contains("p must be a positive integer"));
    }

    #[test]
    fn test_zero_partitions_rejected() {
        let err = BenchConfig::new(2, 2, 2)
            .with_partitions(0)
            .validate()
            .unwrap_err();
        assert_eq!(err, MatmulError::InvalidPartitionCount);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let err = BenchConfig::new(2, 2, 2)
            .with_threads(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, MatmulError::ValidationError { .. }));
    }
}
