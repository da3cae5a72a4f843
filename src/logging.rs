//! Log subscriber setup for the `parmul` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary (or to tests that want to see the output).

use tracing::metadata::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Level and per-target directives applied on top of `RUST_LOG`.
pub struct LogSpec {
    level: Level,
    directives: Vec<Directive>,
}

impl Default for LogSpec {
    fn default() -> Self {
        Self::new(vec![]).with_level(Level::INFO)
    }
}

impl LogSpec {
    pub fn new(directives: Vec<Directive>) -> Self {
        Self {
            level: Level::INFO,
            directives,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;

        self
    }

    fn filter(self) -> EnvFilter {
        let mut filter = EnvFilter::builder()
            .with_default_directive(self.level.into())
            .from_env_lossy();

        for d in self.directives {
            filter = filter.add_directive(d);
        }
        filter
    }
}

/// Enables logs at `INFO` unless `RUST_LOG` says otherwise.
pub fn enable_logs() {
    enable_logs_for(LogSpec::default())
}

/// Installs a stderr `fmt` subscriber for `spec`. Does nothing if a global
/// subscriber is already set.
pub fn enable_logs_for(spec: LogSpec) {
    tracing_subscriber::fmt()
        .with_env_filter(spec.filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}
