//! Clustering engine
//!
//! Groups transactions by size and category: `amount_log` is standardized,
//! `category` is one-hot encoded, and `linfa-clustering` k-means runs over
//! the combined matrix. The model is refit from scratch on every call.

use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::ClusteringConfig;
use crate::error::{Error, Result};
use crate::ml::{OneHotEncoder, StandardScaler};
use crate::models::FeatureRecord;

const STAGE: &str = "clustering";

/// Fitted transform plus k-means model
#[derive(Debug)]
pub struct ClusterModel {
    scaler: StandardScaler,
    encoder: OneHotEncoder,
    kmeans: KMeans<f64, L2Dist>,
    /// Label of every training row
    labels: Array1<usize>,
    inertia: f64,
}

impl ClusterModel {
    /// Assign clusters to rows, which need not be the training rows
    ///
    /// Categories unseen during training encode as all zeros.
    pub fn predict(&self, features: &[FeatureRecord]) -> Vec<usize> {
        let x = encode_rows(&self.scaler, &self.encoder, features);
        let labels: Array1<usize> = self.kmeans.predict(&x);
        labels.to_vec()
    }

    pub fn n_clusters(&self) -> usize {
        self.kmeans.centroids().nrows()
    }

    /// Number of training rows in each cluster
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    /// Within-cluster sum of squared distances on the training rows
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Categories known to the encoder, in column order
    pub fn categories(&self) -> &[String] {
        self.encoder.categories()
    }
}

/// Standardized `amount_log` followed by the category indicator columns
fn encode_rows(
    scaler: &StandardScaler,
    encoder: &OneHotEncoder,
    features: &[FeatureRecord],
) -> Array2<f64> {
    let mut x = Array2::zeros((features.len(), 1 + encoder.n_columns()));
    for (mut row, f) in x.outer_iter_mut().zip(features) {
        row[0] = scaler.transform_one(f.amount_log);
        if let Some(col) = encoder.column_of(&f.category) {
            row[1 + col] = 1.0;
        }
    }
    x
}

fn compute_inertia(x: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    x.outer_iter()
        .zip(labels)
        .map(|(row, &label)| {
            row.iter()
                .zip(centroids.row(label))
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
        })
        .sum()
}

/// Fit k-means with `k` clusters and `seed`, other settings at their defaults
pub fn train_kmeans(
    features: &[FeatureRecord],
    k: usize,
    seed: u64,
) -> Result<(ClusterModel, Vec<usize>)> {
    let config = ClusteringConfig {
        k,
        seed,
        ..ClusteringConfig::default()
    };
    train_kmeans_with(features, &config)
}

/// Fit k-means and label every row
///
/// Returns `InsufficientData` below the configured sample floor and
/// `Configuration` when there are fewer rows than clusters.
pub fn train_kmeans_with(
    features: &[FeatureRecord],
    config: &ClusteringConfig,
) -> Result<(ClusterModel, Vec<usize>)> {
    if features.len() < config.min_samples.max(1) {
        return Err(Error::InsufficientData {
            stage: STAGE,
            required: config.min_samples.max(1),
            actual: features.len(),
        });
    }
    if config.k == 0 || features.len() < config.k {
        return Err(Error::Configuration(format!(
            "cannot form {} clusters from {} transactions",
            config.k,
            features.len()
        )));
    }

    let amounts: Array1<f64> = features.iter().map(|f| f.amount_log).collect();
    let scaler = StandardScaler::fit(amounts.view());
    let encoder = OneHotEncoder::fit(features.iter().map(|f| f.category.as_str()));
    debug!(
        rows = features.len(),
        categories = encoder.n_columns(),
        k = config.k,
        "Fitting clustering model"
    );

    let dataset = Dataset::from(encode_rows(&scaler, &encoder, features));
    let kmeans = KMeans::params_with_rng(config.k, StdRng::seed_from_u64(config.seed))
        .n_runs(config.n_init)
        .max_n_iterations(config.max_iter as u64)
        .tolerance(config.tolerance)
        .fit(&dataset)?;

    let labels: Array1<usize> = kmeans.predict(dataset.records());
    let inertia = compute_inertia(dataset.records(), &labels, kmeans.centroids());

    info!(k = config.k, inertia, "Clustering complete");

    let assigned = labels.to_vec();
    let model = ClusterModel {
        scaler,
        encoder,
        kmeans,
        labels,
        inertia,
    };
    Ok((model, assigned))
}
