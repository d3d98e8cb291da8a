//! Insights command implementation

use std::path::Path;

use anyhow::Result;
use spendlens_core::{anomaly::detect_anomalies_with, generate_insights, AnalysisConfig, FeatureRecord};
use tracing::warn;

use super::{load_config, load_features, ConfigOverrides, DateRange};

pub fn cmd_insights(
    config_path: Option<&Path>,
    file: &Path,
    range: DateRange,
    overrides: &ConfigOverrides,
) -> Result<()> {
    let config = load_config(config_path, overrides)?;
    let features = load_features(file, range)?;
    let insights = collect_insights(&features, &config)?;

    if insights.is_empty() {
        println!("No insights for this period.");
        return Ok(());
    }

    println!("💡 Insights");
    for (i, insight) in insights.iter().enumerate() {
        println!("   {}. {}", i + 1, insight);
    }

    Ok(())
}

/// Insight statements, with the anomaly stage run first so its count can be reported
pub fn collect_insights(features: &[FeatureRecord], config: &AnalysisConfig) -> Result<Vec<String>> {
    let anomalies = match detect_anomalies_with(features, &config.anomaly) {
        Ok((_, assignments)) => Some(assignments),
        Err(e) if e.is_stage_local() => {
            warn!(error = %e, "Anomaly detection skipped");
            None
        }
        Err(e) => return Err(e.into()),
    };

    Ok(generate_insights(
        features,
        anomalies.as_deref(),
        config.insights.change_threshold_pct,
    ))
}
