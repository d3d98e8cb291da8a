//! Single-column standardization

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Standardizes a column to zero mean and unit variance
///
/// Uses the population standard deviation. A constant column gets a scale
/// of 1.0 so it transforms to all zeros instead of NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: f64,
    pub scale: f64,
}

impl StandardScaler {
    pub fn fit(values: ArrayView1<'_, f64>) -> Self {
        let Some(mean) = values.mean() else {
            return Self {
                mean: 0.0,
                scale: 1.0,
            };
        };
        let std = values.std(0.0);

        Self {
            mean,
            scale: if std > f64::EPSILON { std } else { 1.0 },
        }
    }

    pub fn transform_one(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }

    pub fn transform(&self, values: ArrayView1<'_, f64>) -> Array1<f64> {
        values.mapv(|v| self.transform_one(v))
    }
}
