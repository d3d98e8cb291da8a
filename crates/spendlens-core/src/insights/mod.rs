//! Insight Engine - plain-language statements about spending
//!
//! Rules read a shared [`AnalysisContext`] of aggregates and each produce
//! zero or more statements. The engine runs them in a fixed order:
//!
//! - **Last month total** - KPI for the most recent month
//! - **Month over month** - overall change vs the month before
//! - **Category changes** - new categories and moves past the threshold
//! - **Top categories** - the three largest categories overall
//! - **Anomaly count** - how many rows the anomaly stage flagged
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spendlens_core::insights::{AnalysisContext, InsightEngine};
//!
//! let ctx = AnalysisContext::new(&features, Some(&assignments));
//! for insight in InsightEngine::with_change_threshold(15.0).generate(&ctx) {
//!     println!("{}", insight);
//! }
//! ```

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::{generate_insights, AnalysisContext, InsightEngine, InsightRule};
pub use rules::{
    AnomalyCountRule, CategoryChangeRule, LastMonthTotalRule, MonthOverMonthRule,
    TopCategoriesRule,
};
pub use types::{Insight, InsightKind};
