//! Error types for Spendlens

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required field could not be interpreted (e.g. an unparsable date)
    /// or a required column is missing. Aborts the whole request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Too few rows for a model stage. The stage is skipped, the request
    /// carries on.
    #[error("Insufficient data for {stage}: need at least {required} records, got {actual}")]
    InsufficientData {
        stage: &'static str,
        required: usize,
        actual: usize,
    },

    /// A stage was asked to do something its inputs can't support
    /// (e.g. more clusters than rows).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The k-means fit itself failed. Only the clustering stage is lost.
    #[error("Clustering error: {0}")]
    Clustering(#[from] linfa_clustering::KMeansError),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl Error {
    /// True for errors that only disable one model stage.
    pub fn is_stage_local(&self) -> bool {
        matches!(
            self,
            Error::InsufficientData { .. } | Error::Configuration(_) | Error::Clustering(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
