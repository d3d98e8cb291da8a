//! Domain models for Spendlens

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A ledger row as read from the CSV, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub date: String,
    pub category: String,
    pub amount: String,
    pub description: String,
}

/// A transaction after feature engineering has interpreted its fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub category: String,
    /// Always >= 0; the sign from the source is discarded
    pub amount: f64,
    pub description: String,
}

/// Ordinal size class for a transaction amount
///
/// Boundaries are fixed: 5, 20, 50, 100, 500. Each bin includes its
/// lower bound, so an amount of exactly 20.0 is `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountBucket {
    VerySmall,
    Small,
    Medium,
    Large,
    VeryLarge,
    Huge,
}

impl AmountBucket {
    /// Upper (exclusive) bound of every bucket except `Huge`
    pub const BOUNDARIES: [f64; 5] = [5.0, 20.0, 50.0, 100.0, 500.0];

    pub fn from_amount(amount: f64) -> Self {
        match amount {
            a if a < Self::BOUNDARIES[0] => Self::VerySmall,
            a if a < Self::BOUNDARIES[1] => Self::Small,
            a if a < Self::BOUNDARIES[2] => Self::Medium,
            a if a < Self::BOUNDARIES[3] => Self::Large,
            a if a < Self::BOUNDARIES[4] => Self::VeryLarge,
            _ => Self::Huge,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerySmall => "very_small",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::VeryLarge => "very_large",
            Self::Huge => "huge",
        }
    }
}

impl std::str::FromStr for AmountBucket {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "very_small" => Ok(Self::VerySmall),
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            "very_large" => Ok(Self::VeryLarge),
            "huge" => Ok(Self::Huge),
            _ => Err(format!("Unknown amount bucket: {}", s)),
        }
    }
}

impl std::fmt::Display for AmountBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the feature table, one-to-one with a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub year: i32,
    /// Year-month period, e.g. "2025-03"; sorts chronologically as a string
    pub month: String,
    pub day: u32,
    /// English day name, e.g. "Monday"
    pub weekday: String,
    /// ln(1 + amount)
    pub amount_log: f64,
    pub amount_bucket: AmountBucket,
}

impl FeatureRecord {
    /// Derive the feature row for an already-interpreted transaction
    pub fn from_transaction(tx: Transaction) -> Self {
        use chrono::Datelike;

        Self {
            year: tx.date.year(),
            month: tx.date.format("%Y-%m").to_string(),
            day: tx.date.day(),
            weekday: tx.date.format("%A").to_string(),
            amount_log: tx.amount.ln_1p(),
            amount_bucket: AmountBucket::from_amount(tx.amount),
            date: tx.date,
            category: tx.category,
            amount: tx.amount,
            description: tx.description,
        }
    }
}

/// Total spending for one month period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: String,
    pub total: f64,
}

/// Total spending for one category across the whole feature table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Per-category comparison between the two most recent months
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryChange {
    pub category: String,
    pub prev: f64,
    pub last: f64,
    /// Percent change; `f64::INFINITY` when spending is new this month
    pub change_pct: f64,
    pub note: String,
}

impl CategoryChange {
    /// True when the category had nothing the month before and something now
    pub fn is_new_spending(&self) -> bool {
        self.change_pct == f64::INFINITY
    }
}

/// Anomaly flag and score for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAssignment {
    pub is_anomaly: bool,
    /// Lower is more anomalous; negative scores are flagged. Not a probability.
    pub anomaly_score: f64,
}
