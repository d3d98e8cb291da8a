//! Analysis configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the user config dir
//!    (~/.config/spendlens/analysis.toml on Linux) when it exists
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from a file keep their default value.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analysis.toml");

/// Settings for the clustering stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub k: usize,
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
    pub tolerance: f64,
    pub min_samples: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k: 5,
            seed: 42,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
            min_samples: 2,
        }
    }
}

/// Settings for the anomaly detection stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub contamination: f64,
    pub seed: u64,
    pub n_estimators: usize,
    pub max_samples: usize,
    pub min_samples: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            contamination: 0.02,
            seed: 42,
            n_estimators: 100,
            max_samples: 256,
            min_samples: 5,
        }
    }
}

/// Settings for insight generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Minimum absolute percent change for a category statement
    pub change_threshold_pct: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            change_threshold_pct: 10.0,
        }
    }
}

/// Complete configuration for one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub clustering: ClusteringConfig,
    pub anomaly: AnomalyConfig,
    pub insights: InsightConfig,
}

impl AnalysisConfig {
    /// Load configuration (explicit path or user override first, then default)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let override_path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let content = match override_path {
            Some(path) => {
                debug!(path = %path.display(), "Loading analysis config");
                fs::read_to_string(&path)?
            }
            None => return Self::embedded(),
        };

        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// The defaults compiled into the binary, ignoring any override file
    pub fn embedded() -> Result<Self> {
        let config = Self::from_toml(DEFAULT_CONFIG)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check every value is within the range the stages accept
    pub fn validate(&self) -> Result<()> {
        let c = &self.clustering;
        if c.k < 2 {
            return Err(Error::Configuration(format!(
                "cluster count must be at least 2, got {}",
                c.k
            )));
        }
        if c.n_init == 0 || c.max_iter == 0 {
            return Err(Error::Configuration(
                "n_init and max_iter must be at least 1".into(),
            ));
        }
        if !(c.tolerance > 0.0 && c.tolerance.is_finite()) {
            return Err(Error::Configuration(format!(
                "tolerance must be a positive number, got {}",
                c.tolerance
            )));
        }

        let a = &self.anomaly;
        validate_contamination(a.contamination)?;
        if a.n_estimators == 0 || a.max_samples == 0 {
            return Err(Error::Configuration(
                "n_estimators and max_samples must be at least 1".into(),
            ));
        }

        if c.min_samples == 0 || a.min_samples == 0 {
            return Err(Error::Configuration(
                "minimum sample counts must be at least 1".into(),
            ));
        }

        let t = self.insights.change_threshold_pct;
        if !(t >= 0.0 && t.is_finite()) {
            return Err(Error::Configuration(format!(
                "change threshold must be a non-negative number, got {}",
                t
            )));
        }

        Ok(())
    }
}

/// Contamination is an expected outlier fraction in the open interval (0, 0.5)
pub(crate) fn validate_contamination(contamination: f64) -> Result<()> {
    if contamination > 0.0 && contamination < 0.5 {
        Ok(())
    } else {
        Err(Error::Configuration(format!(
            "contamination must be in (0, 0.5), got {}",
            contamination
        )))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spendlens").join("analysis.toml"))
}
