//! Analyze command implementation

use std::path::Path;

use anyhow::{Context, Result};
use spendlens_core::{analyze, AnalysisReport, FeatureRecord, StageOutcome};

use super::{load_config, load_features, truncate, ConfigOverrides, DateRange};

pub fn cmd_analyze(
    config_path: Option<&Path>,
    file: &Path,
    range: DateRange,
    overrides: &ConfigOverrides,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path, overrides)?;
    let features = load_features(file, range)?;
    let report = analyze(&features, &config).context("Analysis failed")?;

    if json {
        let output =
            serde_json::to_string_pretty(&report).context("Failed to serialize report to JSON")?;
        println!("{}", output);
    } else {
        for line in format_report(&report, &features) {
            println!("{}", line);
        }
    }

    Ok(())
}

/// Render the report as text lines
pub fn format_report(report: &AnalysisReport, features: &[FeatureRecord]) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "📊 Spending Analysis".to_string(),
        format!("   Transactions: {}", report.transaction_count),
        "   ─────────────────────────────────────────────────────────────".to_string(),
    ];

    if features.is_empty() {
        lines.push("   No transactions found in this period.".to_string());
        return lines;
    }

    if let Some(last) = &report.last_month_total {
        lines.push(format!("   Last month ({}): {:.2}", last.month, last.total));
    }
    match report.month_over_month_change {
        Some(pct) => lines.push(format!("   Change vs previous month: {:+.1}%", pct)),
        None => lines.push("   Change vs previous month: n/a".to_string()),
    }

    lines.push(String::new());
    lines.push("📅 Monthly Trend".to_string());
    for month in &report.monthly {
        lines.push(format!("   {} │ {:>10.2}", month.month, month.total));
    }

    let grand_total: f64 = report.category_totals.iter().map(|c| c.total).sum();
    lines.push(String::new());
    lines.push("🏷️  Category Breakdown".to_string());
    for cat in &report.category_totals {
        let share = if grand_total > 0.0 {
            cat.total / grand_total * 100.0
        } else {
            0.0
        };
        lines.push(format!(
            "   {:25} │ {:>10.2} │ {:>5.1}%",
            truncate(&cat.category, 25),
            cat.total,
            share
        ));
    }

    lines.push(String::new());
    match &report.clusters {
        StageOutcome::Completed(clusters) => {
            lines.push(format!("🧩 Clusters (k={})", clusters.k));
            for (label, (size, samples)) in clusters.sizes.iter().zip(&clusters.samples).enumerate()
            {
                lines.push(format!("   Cluster {}: {} transactions", label, size));
                for &row in samples {
                    lines.push(format!("      {}", describe_row(&features[row])));
                }
            }
        }
        StageOutcome::Skipped { reason } => {
            lines.push("🧩 Clusters".to_string());
            lines.push(format!("   Skipped: {}", reason));
        }
    }

    lines.push(String::new());
    match &report.anomalies {
        StageOutcome::Completed(anomalies) if anomalies.flagged.is_empty() => {
            lines.push("⚠️  Anomalies".to_string());
            lines.push("   None flagged".to_string());
        }
        StageOutcome::Completed(anomalies) => {
            lines.push(format!("⚠️  Anomalies ({} flagged)", anomalies.flagged.len()));
            for &row in &anomalies.flagged {
                lines.push(format!(
                    "   {} │ score {:.4}",
                    describe_row(&features[row]),
                    anomalies.assignments[row].anomaly_score
                ));
            }
        }
        StageOutcome::Skipped { reason } => {
            lines.push("⚠️  Anomalies".to_string());
            lines.push(format!("   Skipped: {}", reason));
        }
    }

    lines.push(String::new());
    lines.push("💡 Insights".to_string());
    for (i, insight) in report.insights.iter().enumerate() {
        lines.push(format!("   {}. {}", i + 1, insight));
    }

    lines
}

fn describe_row(f: &FeatureRecord) -> String {
    format!(
        "{} │ {:15} │ {:>9.2} │ {}",
        f.date,
        truncate(&f.category, 15),
        f.amount,
        truncate(&f.description, 30)
    )
}
