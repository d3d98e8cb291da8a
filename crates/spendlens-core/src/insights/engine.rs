//! Insight Engine - evaluates rules in a fixed order

use crate::analysis::{category_totals, compare_table, monthly_spending, spending_by_category_month};
use crate::models::{AnomalyAssignment, CategoryChange, CategoryTotal, FeatureRecord, MonthlyTotal};

use super::rules::{
    AnomalyCountRule, CategoryChangeRule, LastMonthTotalRule, MonthOverMonthRule,
    TopCategoriesRule,
};
use super::types::{Insight, InsightKind};

/// Aggregates shared by every rule, computed once per run
pub struct AnalysisContext<'a> {
    /// Anomaly output, when that stage ran
    pub anomalies: Option<&'a [AnomalyAssignment]>,
    pub monthly: Vec<MonthlyTotal>,
    /// Per-category change between the two most recent months
    pub changes: Vec<CategoryChange>,
    pub category_totals: Vec<CategoryTotal>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        features: &[FeatureRecord],
        anomalies: Option<&'a [AnomalyAssignment]>,
    ) -> Self {
        Self {
            anomalies,
            monthly: monthly_spending(features),
            changes: compare_table(&spending_by_category_month(features)),
            category_totals: category_totals(features),
        }
    }

    /// Number of flagged rows, if anomaly output was supplied
    pub fn anomaly_count(&self) -> Option<usize> {
        self.anomalies
            .map(|a| a.iter().filter(|a| a.is_anomaly).count())
    }
}

/// A rule that turns aggregates into zero or more statements
pub trait InsightRule: Send + Sync {
    /// Kind of statement this rule produces
    fn id(&self) -> InsightKind;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Evaluate against the context; an empty result means "nothing to say"
    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight>;
}

/// Runs insight rules in registration order
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in rules and the default 10% threshold
    pub fn new() -> Self {
        Self::with_change_threshold(CategoryChangeRule::DEFAULT_THRESHOLD_PCT)
    }

    /// Create an engine whose category rule reports changes of at least `threshold_pct`
    pub fn with_change_threshold(threshold_pct: f64) -> Self {
        let mut engine = Self { rules: vec![] };

        // Statement order is part of the output contract
        engine.register(Box::new(LastMonthTotalRule));
        engine.register(Box::new(MonthOverMonthRule));
        engine.register(Box::new(CategoryChangeRule::new(threshold_pct)));
        engine.register(Box::new(TopCategoriesRule::default()));
        engine.register(Box::new(AnomalyCountRule));

        engine
    }

    /// Append a rule; it runs after every rule registered before it
    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Evaluate every rule and concatenate their statements
    pub fn generate(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let mut insights = vec![];

        for rule in &self.rules {
            let found = rule.evaluate(ctx);
            tracing::debug!(
                rule = rule.id().as_str(),
                name = rule.name(),
                count = found.len(),
                "Insight rule evaluated"
            );
            insights.extend(found);
        }

        insights
    }

    /// Kinds of the registered rules, in evaluation order
    pub fn rule_kinds(&self) -> Vec<InsightKind> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Display names of the registered rules, in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

/// Produce the ordered list of insight statements for a feature table
pub fn generate_insights(
    features: &[FeatureRecord],
    anomalies: Option<&[AnomalyAssignment]>,
    threshold_pct: f64,
) -> Vec<String> {
    let ctx = AnalysisContext::new(features, anomalies);
    InsightEngine::with_change_threshold(threshold_pct)
        .generate(&ctx)
        .into_iter()
        .map(|i| i.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;
    use chrono::NaiveDate;

    fn record(date: &str, category: &str, amount: f64) -> FeatureRecord {
        FeatureRecord::from_transaction(Transaction {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category: category.to_string(),
            amount,
            description: String::new(),
        })
    }

    struct FixedRule;

    impl InsightRule for FixedRule {
        fn id(&self) -> InsightKind {
            InsightKind::TopCategories
        }

        fn name(&self) -> &'static str {
            "Fixed"
        }

        fn evaluate(&self, _ctx: &AnalysisContext<'_>) -> Vec<Insight> {
            vec![Insight::new(InsightKind::TopCategories, "custom")]
        }
    }

    #[test]
    fn test_engine_rule_order() {
        let engine = InsightEngine::new();
        assert_eq!(
            engine.rule_kinds(),
            vec![
                InsightKind::LastMonthTotal,
                InsightKind::MonthOverMonth,
                InsightKind::CategoryChange,
                InsightKind::TopCategories,
                InsightKind::AnomalyCount,
            ]
        );
    }

    #[test]
    fn test_engine_rule_names() {
        let mut engine = InsightEngine::new();
        engine.register(Box::new(FixedRule));
        assert_eq!(
            engine.rule_names(),
            vec![
                "Last Month Total",
                "Month Over Month",
                "Category Changes",
                "Top Categories",
                "Anomaly Count",
                "Fixed",
            ]
        );
    }

    #[test]
    fn test_empty_features_produce_no_insights() {
        assert!(generate_insights(&[], None, 10.0).is_empty());
        assert!(generate_insights(&[], Some(&[]), 10.0).is_empty());
    }

    #[test]
    fn test_statements_in_fixed_order() {
        let features = vec![
            record("2025-01-03", "Food", 100.0),
            record("2025-01-04", "Bills", 50.0),
            record("2025-02-03", "Food", 150.0),
            record("2025-02-10", "Bills", 50.0),
            record("2025-02-11", "Travel", 30.0),
        ];
        let anomalies = vec![
            AnomalyAssignment {
                is_anomaly: false,
                anomaly_score: 0.1,
            },
            AnomalyAssignment {
                is_anomaly: true,
                anomaly_score: -0.05,
            },
        ];

        let ctx = AnalysisContext::new(&features, Some(&anomalies));
        let kinds: Vec<InsightKind> = InsightEngine::new()
            .generate(&ctx)
            .into_iter()
            .map(|i| i.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                InsightKind::LastMonthTotal,
                InsightKind::MonthOverMonth,
                InsightKind::CategoryChange, // Food +50%
                InsightKind::CategoryChange, // Travel is new
                InsightKind::TopCategories,
                InsightKind::AnomalyCount,
            ]
        );
    }

    #[test]
    fn test_registered_rule_runs_last() {
        let features = vec![record("2025-01-03", "Food", 10.0)];
        let mut engine = InsightEngine::new();
        engine.register(Box::new(FixedRule));

        let insights = engine.generate(&AnalysisContext::new(&features, None));
        assert_eq!(insights.last().unwrap().text, "custom");
    }

    #[test]
    fn test_anomaly_count_counts_flags_only() {
        let features = vec![record("2025-01-03", "Food", 10.0)];
        let anomalies = vec![
            AnomalyAssignment {
                is_anomaly: true,
                anomaly_score: -0.2,
            },
            AnomalyAssignment {
                is_anomaly: false,
                anomaly_score: 0.2,
            },
        ];

        let ctx = AnalysisContext::new(&features, Some(&anomalies));
        assert_eq!(ctx.anomaly_count(), Some(1));
        assert_eq!(AnalysisContext::new(&features, None).anomaly_count(), None);
    }
}
