use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use nestegg_core::WhatIfAdjustments;

#[derive(Parser, Debug)]
#[command(name = "nestegg")]
#[command(about = "Canadian retirement withdrawal and tax simulator")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Write the JSON output here instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a household plan and print the year-by-year response
    Simulate {
        /// Household JSON file, or `-` for stdin
        input: PathBuf,
    },
    /// Check a household plan without running it
    Validate {
        input: PathBuf,
    },
    /// Re-run a plan with adjustments applied
    WhatIf {
        input: PathBuf,
        #[command(flatten)]
        adjustments: AdjustmentArgs,
        /// Print baseline, adjusted and the summary diff
        #[arg(long)]
        compare: bool,
    },
    /// Run randomized market trials
    MonteCarlo {
        input: PathBuf,
        #[arg(short, long, default_value_t = 1_000)]
        trials: usize,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// JSON file with return profiles per asset class
        #[arg(long)]
        profiles: Option<PathBuf>,
        /// Drop per-trial outcomes from the output
        #[arg(long)]
        summary_only: bool,
    },
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct AdjustmentArgs {
    #[arg(long, default_value_t = 1.0)]
    pub spending_multiplier: f64,
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub retirement_age_shift: i32,
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub cpp_start_age_shift: i32,
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub oas_start_age_shift: i32,
}

impl From<AdjustmentArgs> for WhatIfAdjustments {
    fn from(args: AdjustmentArgs) -> Self {
        WhatIfAdjustments {
            spending_multiplier: args.spending_multiplier,
            retirement_age_shift: args.retirement_age_shift,
            cpp_start_age_shift: args.cpp_start_age_shift,
            oas_start_age_shift: args.oas_start_age_shift,
        }
    }
}
