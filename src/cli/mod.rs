use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "apuracao")]
#[command(
    version,
    about = "Brazilian Lucro Real tax calculator (ICMS, PIS, COFINS, IRPJ, CSLL, DRE)"
)]
#[command(
    long_about = "Compute ICMS, PIS, COFINS, IRPJ and CSLL for a company under Lucro Real from a JSON or TOML scenario file, and assemble the resulting income statement (DRE)."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute every tax and the income statement for a scenario
    Calculate {
        /// Path to the scenario file (.json or .toml)
        file: PathBuf,
    },

    /// Show only the income statement (DRE) for a scenario
    Dre {
        /// Path to the scenario file (.json or .toml)
        file: PathBuf,
    },

    /// Check a scenario for inconsistent rates, percentages and amounts
    Validate {
        /// Path to the scenario file (.json or .toml)
        file: PathBuf,
    },

    /// Print a sample scenario to start from
    Sample {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = SampleFormat::Json)]
        format: SampleFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleFormat {
    Json,
    Toml,
}
