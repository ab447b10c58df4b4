use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "fwscan")]
#[command(about = "Intel HEX firmware analyzer for Cortex-M images", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default)]
pub struct GlobalOptions {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// TOML file with analysis settings
    #[arg(long, global = true, env = "FWSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Minimum printable run reported as a string
    #[arg(long = "min-len", global = true)]
    pub min_len: Option<usize>,

    /// Skip writing disassembly listings
    #[arg(long = "no-listings", global = true)]
    pub no_listings: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Filter a HEX file and export its segments as binaries and listings
    Extract {
        /// Intel HEX input
        input: PathBuf,

        /// Output prefix (defaults to the input path without extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scan exported segments for strings, function starts and the reset vector
    Report {
        /// Sidecar JSON files written by `extract`
        #[arg(required = true)]
        sidecars: Vec<PathBuf>,

        /// Output prefix (defaults to the first sidecar's prefix)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run `extract` then `report` in one pass
    Analyze {
        /// Intel HEX input
        input: PathBuf,

        /// Output prefix (defaults to the input path without extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
