//! Isolation Forest outlier detection
//!
//! Each tree isolates points with random axis-aligned splits on a random
//! subsample. Outliers take fewer splits to isolate, so a short average
//! path length means an anomalous point.
//!
//! Scores follow the usual convention: `score_samples` is
//! `-2^(-E[h(x)] / c(psi))`, in [-1, 0], lower is more anomalous. The
//! decision offset is the `contamination` percentile of training scores.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Isolation Forest parameters (unfitted)
#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForest {
    n_estimators: usize,
    max_samples: usize,
    contamination: f64,
    seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted forest
#[derive(Debug, Clone, PartialEq)]
pub struct FittedIsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
    /// Scores below this are outliers
    offset: f64,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new()
    }
}

impl IsolationForest {
    pub fn new() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.1,
            seed: 42,
        }
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators.max(1);
        self
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples.max(1);
        self
    }

    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&self, x: &[Vec<f64>]) -> Result<FittedIsolationForest> {
        if x.is_empty() {
            return Err(Error::InsufficientData {
                stage: "isolation forest",
                required: 1,
                actual: 0,
            });
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(Error::Configuration(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }

        let sample_size = self.max_samples.min(x.len());
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let trees = (0..self.n_estimators)
            .map(|_| {
                let mut indices = sample(&mut rng, x.len(), sample_size).into_vec();
                build_tree(x, &mut indices, 0, max_depth, &mut rng)
            })
            .collect();

        let mut forest = FittedIsolationForest {
            trees,
            sample_size,
            offset: 0.0,
        };

        let mut scores = forest.score_samples(x);
        scores.sort_by(|a, b| a.total_cmp(b));
        forest.offset = percentile(&scores, self.contamination * 100.0);

        Ok(forest)
    }
}

impl FittedIsolationForest {
    /// Raw anomaly score per row, in [-1, 0]; lower is more anomalous
    pub fn score_samples(&self, x: &[Vec<f64>]) -> Vec<f64> {
        let norm = average_path_length(self.sample_size);
        x.iter()
            .map(|point| {
                let mean_depth = self
                    .trees
                    .iter()
                    .map(|tree| path_length(tree, point, 0))
                    .sum::<f64>()
                    / self.trees.len() as f64;
                let ratio = if norm > 0.0 { mean_depth / norm } else { 0.0 };
                -(2f64.powf(-ratio))
            })
            .collect()
    }

    /// Score shifted by the contamination offset; negative means outlier
    pub fn decision_function(&self, x: &[Vec<f64>]) -> Vec<f64> {
        self.score_samples(x)
            .into_iter()
            .map(|s| s - self.offset)
            .collect()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn build_tree(
    x: &[Vec<f64>],
    indices: &mut [usize],
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= max_depth || indices.len() <= 1 {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    // Only features that still vary within this node can split it
    let n_features = x[indices[0]].len();
    let splittable: Vec<(usize, f64, f64)> = (0..n_features)
        .filter_map(|f| {
            let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                (lo.min(x[i][f]), hi.max(x[i][f]))
            });
            (hi > lo).then_some((f, lo, hi))
        })
        .collect();

    if splittable.is_empty() {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let (feature, lo, hi) = splittable[rng.gen_range(0..splittable.len())];
    let threshold = rng.gen_range(lo..hi);

    // Partition in place: values below the threshold go left
    let mut split = 0;
    for i in 0..indices.len() {
        if x[indices[i]][feature] < threshold {
            indices.swap(i, split);
            split += 1;
        }
    }

    let (left, right) = indices.split_at_mut(split);
    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(x, left, depth + 1, max_depth, rng)),
        right: Box::new(build_tree(x, right, depth + 1, max_depth, rng)),
    }
}

fn path_length(node: &Node, point: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            let next = if point[*feature] < *threshold { left } else { right };
            path_length(next, point, depth + 1)
        }
    }
}

/// Expected path length of an unsuccessful BST search over `n` points
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolated percentile of sorted values; `q` in [0, 100]
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (q / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
