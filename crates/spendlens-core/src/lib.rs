//! Spendlens Core Library
//!
//! Transaction analytics for a personal spending ledger:
//! - CSV import and category cleaning
//! - Feature engineering (calendar fields, log amount, size bucket)
//! - Monthly and per-category spending aggregates
//! - K-means clustering over amount and category
//! - Isolation-forest anomaly detection
//! - Rule-based insight statements
//! - Layered TOML configuration

pub mod analysis;
pub mod anomaly;
pub mod cluster;
pub mod config;
pub mod error;
pub mod import;
pub mod insights;
pub mod ml;
pub mod models;
pub mod pipeline;
pub mod report;

pub use analysis::{
    category_totals, compare_last_two_months, month_over_month_change, monthly_spending,
    spending_by_category_month, CategoryMonthTable,
};
pub use anomaly::{detect_anomalies, detect_anomalies_with, AnomalyModel};
pub use cluster::{train_kmeans, train_kmeans_with, ClusterModel};
pub use config::{AnalysisConfig, AnomalyConfig, ClusteringConfig, InsightConfig};
pub use error::{Error, Result};
pub use import::{load_transactions, read_transactions};
pub use insights::{generate_insights, Insight, InsightEngine, InsightKind};
pub use models::{
    AmountBucket, AnomalyAssignment, CategoryChange, CategoryTotal, FeatureRecord, MonthlyTotal,
    RawTransaction, Transaction,
};
pub use pipeline::{
    clean_categories, feature_engineer, preprocess_pipeline, preprocess_reader, UNCATEGORIZED,
};
pub use report::{analyze, AnalysisReport, AnomalySummary, ClusterSummary, StageOutcome};
