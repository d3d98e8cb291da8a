//! Feature table export

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use spendlens_core::FeatureRecord;

use super::{load_features, DateRange};
use crate::cli::OutputFormat;

pub fn cmd_features(file: &Path, format: OutputFormat) -> Result<()> {
    let features = load_features(file, DateRange::default())?;
    let stdout = io::stdout();
    write_features(&features, format, stdout.lock())
}

/// Write the feature table as CSV (with header) or a JSON array
pub fn write_features<W: Write>(
    features: &[FeatureRecord],
    format: OutputFormat,
    mut writer: W,
) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(writer);
            for record in features {
                wtr.serialize(record)
                    .context("Failed to write feature row")?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, features)
                .context("Failed to serialize features to JSON")?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
