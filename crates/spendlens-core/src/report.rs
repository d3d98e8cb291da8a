//! One analysis request over a feature table
//!
//! Stages run in a fixed order: aggregates, clustering, anomaly detection,
//! insights. A model stage that can't run on this data is reported as
//! skipped instead of failing the request.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::{category_totals, month_over_month_change, monthly_spending};
use crate::anomaly::detect_anomalies_with;
use crate::cluster::train_kmeans_with;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::insights::generate_insights;
use crate::models::{AnomalyAssignment, CategoryTotal, FeatureRecord, MonthlyTotal};

/// Sample rows kept per cluster
const SAMPLES_PER_CLUSTER: usize = 3;

/// Result of a model stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome<T> {
    Completed(T),
    Skipped { reason: String },
}

impl<T> StageOutcome<T> {
    pub fn completed(&self) -> Option<&T> {
        match self {
            StageOutcome::Completed(value) => Some(value),
            StageOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StageOutcome::Skipped { .. })
    }
}

/// Cluster assignments for the request's rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub k: usize,
    /// One label per feature row
    pub labels: Vec<usize>,
    /// Rows per cluster, indexed by label
    pub sizes: Vec<usize>,
    /// Up to three row indices per cluster, in row order
    pub samples: Vec<Vec<usize>>,
    pub inertia: f64,
}

impl ClusterSummary {
    fn new(k: usize, labels: Vec<usize>, inertia: f64) -> Self {
        let mut sizes = vec![0; k];
        let mut samples = vec![Vec::new(); k];
        for (row, &label) in labels.iter().enumerate() {
            sizes[label] += 1;
            if samples[label].len() < SAMPLES_PER_CLUSTER {
                samples[label].push(row);
            }
        }

        Self {
            k,
            labels,
            sizes,
            samples,
            inertia,
        }
    }
}

/// Anomaly assignments for the request's rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalySummary {
    /// One assignment per feature row
    pub assignments: Vec<AnomalyAssignment>,
    /// Indices of flagged rows, most anomalous first
    pub flagged: Vec<usize>,
}

impl AnomalySummary {
    fn new(assignments: Vec<AnomalyAssignment>) -> Self {
        let mut flagged: Vec<usize> = assignments
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_anomaly)
            .map(|(i, _)| i)
            .collect();
        flagged.sort_by(|&a, &b| {
            assignments[a]
                .anomaly_score
                .total_cmp(&assignments[b].anomaly_score)
        });

        Self {
            assignments,
            flagged,
        }
    }
}

/// Everything one request produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub transaction_count: usize,
    pub monthly: Vec<MonthlyTotal>,
    pub last_month_total: Option<MonthlyTotal>,
    pub month_over_month_change: Option<f64>,
    pub category_totals: Vec<CategoryTotal>,
    pub clusters: StageOutcome<ClusterSummary>,
    pub anomalies: StageOutcome<AnomalySummary>,
    pub insights: Vec<String>,
}

/// Run every stage over `features`
///
/// Only errors that aren't stage-local abort the request.
pub fn analyze(features: &[FeatureRecord], config: &AnalysisConfig) -> Result<AnalysisReport> {
    debug!(rows = features.len(), "Starting analysis");

    let monthly = monthly_spending(features);
    let month_over_month = month_over_month_change(&monthly);

    let clusters = stage_outcome(
        "clustering",
        train_kmeans_with(features, &config.clustering)
            .map(|(model, labels)| ClusterSummary::new(model.n_clusters(), labels, model.inertia())),
    )?;

    let anomalies = stage_outcome(
        "anomaly detection",
        detect_anomalies_with(features, &config.anomaly)
            .map(|(_, assignments)| AnomalySummary::new(assignments)),
    )?;

    let insights = generate_insights(
        features,
        anomalies.completed().map(|a| a.assignments.as_slice()),
        config.insights.change_threshold_pct,
    );

    info!(
        rows = features.len(),
        clustering_skipped = clusters.is_skipped(),
        anomalies_skipped = anomalies.is_skipped(),
        insights = insights.len(),
        "Analysis complete"
    );

    Ok(AnalysisReport {
        transaction_count: features.len(),
        last_month_total: monthly.last().cloned(),
        month_over_month_change: month_over_month,
        monthly,
        category_totals: category_totals(features),
        clusters,
        anomalies,
        insights,
    })
}

fn stage_outcome<T>(stage: &str, result: Result<T>) -> Result<StageOutcome<T>> {
    match result {
        Ok(value) => Ok(StageOutcome::Completed(value)),
        Err(e) if e.is_stage_local() => {
            warn!(stage, error = %e, "Stage skipped");
            Ok(StageOutcome::Skipped {
                reason: e.to_string(),
            })
        }
        Err(e) => Err(e),
    }
}
