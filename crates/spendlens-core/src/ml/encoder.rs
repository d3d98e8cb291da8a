//! One-hot encoding of category labels

use std::collections::BTreeSet;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Maps each known category to its own indicator column
///
/// Columns are in sorted label order. A label not seen during `fit`
/// encodes as all zeros rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let unique: BTreeSet<&str> = labels.into_iter().collect();
        Self {
            categories: unique.into_iter().map(str::to_string).collect(),
        }
    }

    /// Known categories, in column order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn n_columns(&self) -> usize {
        self.categories.len()
    }

    /// Column holding the indicator for `label`, if it was seen during `fit`
    pub fn column_of(&self, label: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
    }

    pub fn encode(&self, label: &str) -> Array1<f64> {
        let mut out = Array1::zeros(self.n_columns());
        if let Some(col) = self.column_of(label) {
            out[col] = 1.0;
        }
        out
    }
}
