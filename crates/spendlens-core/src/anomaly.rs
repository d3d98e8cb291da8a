//! Anomaly engine
//!
//! Flags transactions whose size is unusual for this ledger. The forest sees
//! a single feature, the standardized `amount_log`.

use ndarray::Array1;
use tracing::{debug, info};

use crate::config::{validate_contamination, AnomalyConfig};
use crate::error::{Error, Result};
use crate::ml::{FittedIsolationForest, IsolationForest, StandardScaler};
use crate::models::{AnomalyAssignment, FeatureRecord};

const STAGE: &str = "anomaly detection";

/// Fitted scaler plus isolation forest
#[derive(Debug, Clone)]
pub struct AnomalyModel {
    scaler: StandardScaler,
    forest: FittedIsolationForest,
}

impl AnomalyModel {
    /// Score rows against the fitted model
    pub fn score(&self, features: &[FeatureRecord]) -> Vec<AnomalyAssignment> {
        let x = encode_rows(&self.scaler, features);
        self.forest
            .decision_function(&x)
            .into_iter()
            .map(|anomaly_score| AnomalyAssignment {
                is_anomaly: anomaly_score < 0.0,
                anomaly_score,
            })
            .collect()
    }

    /// Raw forest score below which a row is flagged
    pub fn threshold_offset(&self) -> f64 {
        self.forest.offset()
    }

    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }
}

fn encode_rows(scaler: &StandardScaler, features: &[FeatureRecord]) -> Vec<Vec<f64>> {
    features
        .iter()
        .map(|f| vec![scaler.transform_one(f.amount_log)])
        .collect()
}

/// Detect anomalies with the given contamination, other settings at their defaults
pub fn detect_anomalies(
    features: &[FeatureRecord],
    contamination: f64,
) -> Result<(AnomalyModel, Vec<AnomalyAssignment>)> {
    let config = AnomalyConfig {
        contamination,
        ..AnomalyConfig::default()
    };
    detect_anomalies_with(features, &config)
}

/// Fit an isolation forest and score every row
///
/// The flagged fraction approximates `contamination`; ties in score can
/// push it above or below.
pub fn detect_anomalies_with(
    features: &[FeatureRecord],
    config: &AnomalyConfig,
) -> Result<(AnomalyModel, Vec<AnomalyAssignment>)> {
    validate_contamination(config.contamination)?;

    let required = config.min_samples.max(1);
    if features.len() < required {
        return Err(Error::InsufficientData {
            stage: STAGE,
            required,
            actual: features.len(),
        });
    }

    let amounts: Array1<f64> = features.iter().map(|f| f.amount_log).collect();
    let scaler = StandardScaler::fit(amounts.view());
    let x = encode_rows(&scaler, features);
    debug!(
        rows = features.len(),
        contamination = config.contamination,
        "Fitting anomaly model"
    );

    let forest = IsolationForest::new()
        .with_n_estimators(config.n_estimators)
        .with_max_samples(config.max_samples)
        .with_contamination(config.contamination)
        .with_seed(config.seed)
        .fit(&x)?;

    let model = AnomalyModel { scaler, forest };
    let assignments = model.score(features);

    info!(
        flagged = assignments.iter().filter(|a| a.is_anomaly).count(),
        rows = features.len(),
        trees = model.n_trees(),
        offset = model.threshold_offset(),
        "Anomaly detection complete"
    );

    Ok((model, assignments))
}
