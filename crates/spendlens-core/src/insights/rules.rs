//! Built-in insight rules
//!
//! Each rule reads the shared aggregates and returns its statements, or
//! nothing when its trigger isn't met.

use crate::analysis::month_over_month_change;

use super::engine::{AnalysisContext, InsightRule};
use super::types::{Insight, InsightKind};

/// Total spent in the latest month present
pub struct LastMonthTotalRule;

impl InsightRule for LastMonthTotalRule {
    fn id(&self) -> InsightKind {
        InsightKind::LastMonthTotal
    }

    fn name(&self) -> &'static str {
        "Last Month Total"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        ctx.monthly
            .last()
            .map(|last| {
                Insight::new(
                    self.id(),
                    format!(
                        "Total spending in last month ({}): {:.2}",
                        last.month, last.total
                    ),
                )
            })
            .into_iter()
            .collect()
    }
}

/// Overall change vs the previous month
///
/// Silent with a single month, or when the previous month totals zero.
pub struct MonthOverMonthRule;

impl InsightRule for MonthOverMonthRule {
    fn id(&self) -> InsightKind {
        InsightKind::MonthOverMonth
    }

    fn name(&self) -> &'static str {
        "Month Over Month"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        month_over_month_change(&ctx.monthly)
            .map(|pct| Insight::new(self.id(), format!("Change vs previous month: {:.1}%", pct)))
            .into_iter()
            .collect()
    }
}

/// Categories that are new this month or moved by at least the threshold
pub struct CategoryChangeRule {
    /// Minimum absolute percent change to report
    threshold_pct: f64,
}

impl CategoryChangeRule {
    pub const DEFAULT_THRESHOLD_PCT: f64 = 10.0;

    pub fn new(threshold_pct: f64) -> Self {
        Self { threshold_pct }
    }
}

impl Default for CategoryChangeRule {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD_PCT)
    }
}

impl InsightRule for CategoryChangeRule {
    fn id(&self) -> InsightKind {
        InsightKind::CategoryChange
    }

    fn name(&self) -> &'static str {
        "Category Changes"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        ctx.changes
            .iter()
            .filter_map(|change| {
                let text = if change.is_new_spending() {
                    format!(
                        "New spending in {}: {:.2} (no spending last month).",
                        change.category, change.last
                    )
                } else if change.change_pct.abs() >= self.threshold_pct {
                    let direction = if change.change_pct > 0.0 {
                        "increased"
                    } else {
                        "decreased"
                    };
                    format!(
                        "{} spending {} by {:.1}% (from {:.2} to {:.2}).",
                        change.category,
                        direction,
                        change.change_pct.abs(),
                        change.prev,
                        change.last
                    )
                } else {
                    return None;
                };
                Some(Insight::new(self.id(), text))
            })
            .collect()
    }
}

/// The largest categories by total spend
pub struct TopCategoriesRule {
    count: usize,
}

impl Default for TopCategoriesRule {
    fn default() -> Self {
        Self { count: 3 }
    }
}

impl InsightRule for TopCategoriesRule {
    fn id(&self) -> InsightKind {
        InsightKind::TopCategories
    }

    fn name(&self) -> &'static str {
        "Top Categories"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        if ctx.category_totals.is_empty() {
            return vec![];
        }

        let listed: Vec<String> = ctx
            .category_totals
            .iter()
            .take(self.count)
            .map(|t| format!("{} ({:.0})", t.category, t.total))
            .collect();

        vec![Insight::new(
            self.id(),
            format!("Top categories overall: {}", listed.join(", ")),
        )]
    }
}

/// How many transactions the anomaly stage flagged
pub struct AnomalyCountRule;

impl InsightRule for AnomalyCountRule {
    fn id(&self) -> InsightKind {
        InsightKind::AnomalyCount
    }

    fn name(&self) -> &'static str {
        "Anomaly Count"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        match ctx.anomaly_count() {
            Some(n) if n > 0 => vec![Insight::new(
                self.id(),
                format!("Detected {} unusual transactions (possible anomalies).", n),
            )],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnomalyAssignment, FeatureRecord, Transaction};
    use chrono::NaiveDate;

    fn record(date: &str, category: &str, amount: f64) -> FeatureRecord {
        FeatureRecord::from_transaction(Transaction {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category: category.to_string(),
            amount,
            description: String::new(),
        })
    }

    fn texts(rule: &dyn InsightRule, ctx: &AnalysisContext<'_>) -> Vec<String> {
        rule.evaluate(ctx).into_iter().map(|i| i.text).collect()
    }

    #[test]
    fn test_last_month_total() {
        let features = vec![
            record("2025-01-03", "Food", 10.0),
            record("2025-02-03", "Food", 12.5),
            record("2025-02-04", "Bills", 7.5),
        ];
        let ctx = AnalysisContext::new(&features, None);

        assert_eq!(
            texts(&LastMonthTotalRule, &ctx),
            vec!["Total spending in last month (2025-02): 20.00"]
        );
    }

    #[test]
    fn test_month_over_month_single_month_is_silent() {
        let features = vec![record("2025-01-03", "Food", 10.0)];
        let ctx = AnalysisContext::new(&features, None);
        assert!(texts(&MonthOverMonthRule, &ctx).is_empty());
    }

    #[test]
    fn test_month_over_month_zero_previous_is_silent() {
        let features = vec![
            record("2025-01-03", "Food", 0.0),
            record("2025-02-03", "Food", 12.0),
        ];
        let ctx = AnalysisContext::new(&features, None);
        assert!(texts(&MonthOverMonthRule, &ctx).is_empty());
    }

    #[test]
    fn test_month_over_month_change() {
        let features = vec![
            record("2025-01-03", "Food", 200.0),
            record("2025-02-03", "Food", 150.0),
        ];
        let ctx = AnalysisContext::new(&features, None);
        assert_eq!(
            texts(&MonthOverMonthRule, &ctx),
            vec!["Change vs previous month: -25.0%"]
        );
    }

    #[test]
    fn test_category_changes_respect_threshold() {
        let features = vec![
            record("2025-01-03", "Food", 100.0),
            record("2025-01-04", "Bills", 100.0),
            record("2025-01-05", "Health", 100.0),
            record("2025-02-03", "Food", 80.0),
            record("2025-02-04", "Bills", 105.0),
            record("2025-02-05", "Health", 110.0),
        ];
        let ctx = AnalysisContext::new(&features, None);

        assert_eq!(
            texts(&CategoryChangeRule::default(), &ctx),
            vec![
                "Food spending decreased by 20.0% (from 100.00 to 80.00).",
                "Health spending increased by 10.0% (from 100.00 to 110.00).",
            ]
        );
        assert_eq!(texts(&CategoryChangeRule::new(25.0), &ctx).len(), 0);
    }

    #[test]
    fn test_category_new_spending_always_reported() {
        let features = vec![
            record("2025-01-03", "Food", 100.0),
            record("2025-02-03", "Food", 100.0),
            record("2025-02-04", "Pets", 30.0),
        ];
        let ctx = AnalysisContext::new(&features, None);

        assert_eq!(
            texts(&CategoryChangeRule::new(1_000.0), &ctx),
            vec!["New spending in Pets: 30.00 (no spending last month)."]
        );
    }

    #[test]
    fn test_top_categories() {
        let features = vec![
            record("2025-01-03", "Food", 120.4),
            record("2025-01-04", "Bills", 300.0),
            record("2025-01-05", "Health", 45.6),
            record("2025-01-06", "Other", 3.0),
        ];
        let ctx = AnalysisContext::new(&features, None);

        assert_eq!(
            texts(&TopCategoriesRule::default(), &ctx),
            vec!["Top categories overall: Bills (300), Food (120), Health (46)"]
        );
    }

    #[test]
    fn test_anomaly_count_requires_flags() {
        let features = vec![record("2025-01-03", "Food", 10.0)];
        let none_flagged = vec![AnomalyAssignment {
            is_anomaly: false,
            anomaly_score: 0.1,
        }];
        let two_flagged = vec![
            AnomalyAssignment {
                is_anomaly: true,
                anomaly_score: -0.1,
            },
            AnomalyAssignment {
                is_anomaly: true,
                anomaly_score: -0.3,
            },
        ];

        let ctx = AnalysisContext::new(&features, Some(&none_flagged));
        assert!(texts(&AnomalyCountRule, &ctx).is_empty());

        let ctx = AnalysisContext::new(&features, Some(&two_flagged));
        assert_eq!(
            texts(&AnomalyCountRule, &ctx),
            vec!["Detected 2 unusual transactions (possible anomalies)."]
        );
    }
}
