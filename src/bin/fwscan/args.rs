//! Command-line front end.
//!
//! `extract` writes the segment artifacts, `report` rebuilds segments from
//! their sidecars and writes the analysis reports, `analyze` does both.

mod error;
mod execute;
mod io;
mod types;

use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

pub use types::Cli;

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose, cli.global.quiet);

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, 2) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
