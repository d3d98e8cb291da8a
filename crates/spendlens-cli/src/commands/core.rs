//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve the analysis config and apply flag overrides
//! - `apply_overrides` - Layer `--clusters`/`--contamination`/`--threshold` on a config
//! - `DateRange` - The `--from`/`--to` filter
//! - `load_features` - Run the feature pipeline and apply the date range

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use spendlens_core::{preprocess_pipeline, AnalysisConfig, FeatureRecord};
use tracing::debug;

/// Per-run settings given on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigOverrides {
    pub clusters: Option<usize>,
    pub contamination: Option<f64>,
    pub threshold: Option<f64>,
}

/// Load config from `--config` (or the default locations) and apply overrides
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<AnalysisConfig> {
    let config = AnalysisConfig::load(path).context("Failed to load analysis config")?;
    apply_overrides(config, overrides)
}

/// Apply command-line overrides on top of `config` and re-validate
pub fn apply_overrides(
    mut config: AnalysisConfig,
    overrides: &ConfigOverrides,
) -> Result<AnalysisConfig> {
    if let Some(k) = overrides.clusters {
        config.clustering.k = k;
    }
    if let Some(contamination) = overrides.contamination {
        config.anomaly.contamination = contamination;
    }
    if let Some(threshold) = overrides.threshold {
        config.insights.change_threshold_pct = threshold;
    }

    config.validate().context("Invalid analysis settings")?;
    Ok(config)
}

/// Inclusive date filter; an open end means unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let from = from
            .map(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .context("Invalid --from date format (use YYYY-MM-DD)")
            })
            .transpose()?;
        let to = to
            .map(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .context("Invalid --to date format (use YYYY-MM-DD)")
            })
            .transpose()?;

        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                anyhow::bail!("--from {} is after --to {}", from, to);
            }
        }

        Ok(Self { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Run the feature pipeline on a CSV file and keep rows inside `range`
pub fn load_features(file: &Path, range: DateRange) -> Result<Vec<FeatureRecord>> {
    let features = preprocess_pipeline(file)
        .with_context(|| format!("Failed to process transactions from {}", file.display()))?;

    let total = features.len();
    let features: Vec<FeatureRecord> = features
        .into_iter()
        .filter(|f| range.contains(f.date))
        .collect();
    debug!(kept = features.len(), total, "Applied date range");

    Ok(features)
}
