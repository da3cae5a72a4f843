use std::io::{self, Write};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use parmul::config::Args;
use parmul::logging::enable_logs;
use parmul::{BenchConfig, Benchmark, MatmulError};

/// Exit status for a malformed command line.
const EXIT_USAGE: u8 = 2;
/// Exit status for a run that could not be carried out.
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("USAGE: parmul <N> <P> <M>");
            eprintln!("    C(N,M) = A(N,P) * B(P,M)\n");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    enable_logs();

    let config = match BenchConfig::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match Benchmark::new(config).run() {
        Ok(report) => {
            print!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_failure(io::stderr().lock(), &e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Writes a runtime failure to `out`. Independent of the log filter.
fn report_failure(mut out: impl Write, e: &MatmulError) {
    writeln!(out, "benchmark failed: {}", e).ok();
}
