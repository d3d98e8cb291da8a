//! Spending aggregates over the feature table
//!
//! Months are compared by their sorted "YYYY-MM" key, not by calendar
//! adjacency: if a month has no rows it simply isn't there.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{CategoryChange, CategoryTotal, FeatureRecord, MonthlyTotal};

/// Sum of spending per month, sorted by month
pub fn monthly_spending(features: &[FeatureRecord]) -> Vec<MonthlyTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for f in features {
        *totals.entry(f.month.as_str()).or_default() += f.amount;
    }

    totals
        .into_iter()
        .map(|(month, total)| MonthlyTotal {
            month: month.to_string(),
            total,
        })
        .collect()
}

/// Sparse (month, category) spending table
///
/// Every category seen anywhere in the data is a column for every month;
/// combinations with no transactions read as 0.0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMonthTable {
    /// month -> category -> total
    cells: BTreeMap<String, BTreeMap<String, f64>>,
    categories: BTreeSet<String>,
}

impl CategoryMonthTable {
    /// Spending for a month and category, 0.0 when there was none
    pub fn get(&self, month: &str, category: &str) -> f64 {
        self.cells
            .get(month)
            .and_then(|row| row.get(category))
            .copied()
            .unwrap_or(0.0)
    }

    /// Months present, ascending
    pub fn months(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Categories present, in lexicographic order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn n_months(&self) -> usize {
        self.cells.len()
    }

    /// The two most recent months as (previous, last)
    pub fn last_two_months(&self) -> Option<(&str, &str)> {
        let mut recent = self.cells.keys().rev();
        let last = recent.next()?;
        let prev = recent.next()?;
        Some((prev.as_str(), last.as_str()))
    }
}

/// Build the (month, category) spending table
pub fn spending_by_category_month(features: &[FeatureRecord]) -> CategoryMonthTable {
    let mut table = CategoryMonthTable::default();
    for f in features {
        *table
            .cells
            .entry(f.month.clone())
            .or_default()
            .entry(f.category.clone())
            .or_default() += f.amount;
        table.categories.insert(f.category.clone());
    }
    table
}

/// Per-category percent change between the two most recent months
///
/// Empty when fewer than two months are present.
pub fn compare_last_two_months(features: &[FeatureRecord]) -> Vec<CategoryChange> {
    compare_table(&spending_by_category_month(features))
}

pub(crate) fn compare_table(table: &CategoryMonthTable) -> Vec<CategoryChange> {
    let Some((prev_month, last_month)) = table.last_two_months() else {
        return Vec::new();
    };

    table
        .categories()
        .map(|category| {
            let prev = table.get(prev_month, category);
            let last = table.get(last_month, category);
            category_change(category, prev, last)
        })
        .collect()
}

fn category_change(category: &str, prev: f64, last: f64) -> CategoryChange {
    let (change_pct, note) = if !(prev.is_finite() && last.is_finite()) {
        (0.0, "change unavailable".to_string())
    } else if prev == 0.0 {
        if last == 0.0 {
            (0.0, "no change".to_string())
        } else {
            (
                f64::INFINITY,
                format!(
                    "new spending of {:.2} in {} (no previous month spending)",
                    last, category
                ),
            )
        }
    } else {
        let change = (last - prev) / prev * 100.0;
        if change.is_finite() {
            (change, format!("{:.1}%", change))
        } else {
            (0.0, "change unavailable".to_string())
        }
    };

    CategoryChange {
        category: category.to_string(),
        prev,
        last,
        change_pct,
        note,
    }
}

/// Total spending per category, largest first (ties by name)
pub fn category_totals(features: &[FeatureRecord]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for f in features {
        *totals.entry(f.category.as_str()).or_default() += f.amount;
    }

    let mut totals: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    // Stable sort keeps the name order for equal totals
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals
}

/// Percent change of the last monthly total over the one before it
///
/// None with fewer than two months, when the earlier month totals zero, or
/// when the totals are too large for a finite percentage.
pub fn month_over_month_change(monthly: &[MonthlyTotal]) -> Option<f64> {
    match monthly {
        [.., prev, last] if prev.total > 0.0 => {
            Some((last.total - prev.total) / prev.total * 100.0).filter(|pct| pct.is_finite())
        }
        _ => None,
    }
}
