//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Spendlens - Understand where the money goes
#[derive(Parser)]
#[command(name = "spendlens")]
#[command(about = "Transaction analytics for a personal spending ledger", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Analysis config file (TOML)
    ///
    /// Defaults to ~/.config/spendlens/analysis.toml when it exists,
    /// otherwise the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full analysis and print a report
    Analyze {
        /// Transaction CSV (date, category, amount, description)
        #[arg(short, long)]
        file: PathBuf,

        /// Only include transactions on or after this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Only include transactions on or before this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Number of clusters
        #[arg(short = 'k', long)]
        clusters: Option<usize>,

        /// Expected fraction of anomalous transactions, in (0, 0.5)
        #[arg(long)]
        contamination: Option<f64>,

        /// Minimum percent change for a category insight
        #[arg(long)]
        threshold: Option<f64>,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the engineered feature table
    Features {
        /// Transaction CSV (date, category, amount, description)
        #[arg(short, long)]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,
    },

    /// Print insight statements only
    Insights {
        /// Transaction CSV (date, category, amount, description)
        #[arg(short, long)]
        file: PathBuf,

        /// Only include transactions on or after this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Only include transactions on or before this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Minimum percent change for a category insight
        #[arg(long)]
        threshold: Option<f64>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}
