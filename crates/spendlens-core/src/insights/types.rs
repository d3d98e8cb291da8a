//! Core types for the Insight Engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of statement an insight rule can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Total spent in the most recent month
    LastMonthTotal,
    /// Change in total spending vs the month before
    MonthOverMonth,
    /// A category whose spending moved past the threshold, or is new
    CategoryChange,
    /// Largest categories over the whole period
    TopCategories,
    /// Number of transactions flagged as anomalous
    AnomalyCount,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::LastMonthTotal => "last_month_total",
            InsightKind::MonthOverMonth => "month_over_month",
            InsightKind::CategoryChange => "category_change",
            InsightKind::TopCategories => "top_categories",
            InsightKind::AnomalyCount => "anomaly_count",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last_month_total" => Ok(InsightKind::LastMonthTotal),
            "month_over_month" => Ok(InsightKind::MonthOverMonth),
            "category_change" => Ok(InsightKind::CategoryChange),
            "top_categories" => Ok(InsightKind::TopCategories),
            "anomaly_count" => Ok(InsightKind::AnomalyCount),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

/// A single human-readable finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub text: String,
}

impl Insight {
    pub fn new(kind: InsightKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
