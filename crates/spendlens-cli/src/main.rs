//! Spendlens CLI - Transaction analytics for a spending ledger
//!
//! Usage:
//!   spendlens analyze --file CSV     Full report (KPIs, clusters, anomalies, insights)
//!   spendlens features --file CSV    Print the engineered feature table
//!   spendlens insights --file CSV    Print insight statements only

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so report output can be piped
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze {
            file,
            from,
            to,
            clusters,
            contamination,
            threshold,
            json,
        } => {
            let overrides = commands::ConfigOverrides {
                clusters,
                contamination,
                threshold,
            };
            let range = commands::DateRange::parse(from.as_deref(), to.as_deref())?;
            commands::cmd_analyze(config_path, &file, range, &overrides, json)
        }
        Commands::Features { file, format } => commands::cmd_features(&file, format),
        Commands::Insights {
            file,
            from,
            to,
            threshold,
        } => {
            let overrides = commands::ConfigOverrides {
                threshold,
                ..Default::default()
            };
            let range = commands::DateRange::parse(from.as_deref(), to.as_deref())?;
            commands::cmd_insights(config_path, &file, range, &overrides)
        }
    }
}
