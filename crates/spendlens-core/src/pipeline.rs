//! Feature pipeline: raw ledger rows to the feature table
//!
//! The stage order is fixed: load, clean categories, engineer features.
//! Cleaning must run first so that labels it merges (e.g. "Restaurants"
//! into "Food") are already merged when features and aggregates are built.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::import::{coerce_amount, load_transactions, parse_date, read_transactions};
use crate::models::{FeatureRecord, RawTransaction, Transaction};

/// Label used when a row has no category text at all
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Near-duplicate labels collapsed after title-casing
const CATEGORY_SYNONYMS: &[(&str, &str)] = &[
    ("Food & Drinks", "Food"),
    ("Restaurants", "Food"),
    ("Transport", "Transport"),
];

/// Normalize every row's category label
pub fn clean_categories(rows: Vec<RawTransaction>) -> Vec<RawTransaction> {
    rows.into_iter()
        .map(|mut row| {
            row.category = clean_category(&row.category);
            row
        })
        .collect()
}

/// Normalize a single category label: trim, title-case, apply synonyms
pub fn clean_category(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return UNCATEGORIZED.to_string();
    }

    let titled = title_case(trimmed);
    CATEGORY_SYNONYMS
        .iter()
        .find(|(from, _)| *from == titled)
        .map(|(_, to)| to.to_string())
        .unwrap_or(titled)
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                // Keep characters whose upper-case form expands (e.g. 'ß')
                // so a second pass sees the same text.
                let upper = c.to_uppercase();
                if upper.len() == 1 {
                    out.extend(upper);
                } else {
                    out.push(c);
                }
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

/// Interpret raw rows and derive calendar and amount features
///
/// Only an unparsable date is an error. Amounts that don't parse become 0.
pub fn feature_engineer(rows: Vec<RawTransaction>) -> Result<Vec<FeatureRecord>> {
    let mut features = Vec::with_capacity(rows.len());

    for (idx, row) in rows.into_iter().enumerate() {
        let date = parse_date(&row.date).ok_or_else(|| {
            Error::InvalidInput(format!(
                "Unable to parse date on row {}: {:?}",
                idx + 1,
                row.date
            ))
        })?;

        features.push(FeatureRecord::from_transaction(Transaction {
            date,
            category: row.category,
            amount: coerce_amount(&row.amount),
            description: row.description,
        }));
    }

    debug!(rows = features.len(), "Feature engineering complete");
    Ok(features)
}

/// Load a CSV file and run it through the full feature pipeline
pub fn preprocess_pipeline(path: impl AsRef<Path>) -> Result<Vec<FeatureRecord>> {
    let rows = load_transactions(path)?;
    feature_engineer(clean_categories(rows))
}

/// Run CSV data from any reader through the full feature pipeline
pub fn preprocess_reader<R: Read>(reader: R) -> Result<Vec<FeatureRecord>> {
    let rows = read_transactions(reader)?;
    feature_engineer(clean_categories(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AmountBucket;

    fn raw(date: &str, category: &str, amount: &str) -> RawTransaction {
        RawTransaction {
            date: date.to_string(),
            category: category.to_string(),
            amount: amount.to_string(),
            description: format!("{} purchase", category),
        }
    }

    #[test]
    fn test_clean_category_title_cases_and_trims() {
        assert_eq!(clean_category("  groceries "), "Groceries");
        assert_eq!(clean_category("HEALTH"), "Health");
        assert_eq!(clean_category("home improvement"), "Home Improvement");
    }

    #[test]
    fn test_clean_category_applies_synonyms() {
        assert_eq!(clean_category("food & drinks"), "Food");
        assert_eq!(clean_category("RESTAURANTS"), "Food");
        assert_eq!(clean_category("transport"), "Transport");
        assert_eq!(clean_category("Shopping"), "Shopping");
    }

    #[test]
    fn test_clean_category_empty_becomes_uncategorized() {
        assert_eq!(clean_category(""), UNCATEGORIZED);
        assert_eq!(clean_category("   "), UNCATEGORIZED);
    }

    #[test]
    fn test_clean_categories_is_idempotent() {
        let rows = vec![
            raw("2025-01-01", " food & drinks", "10"),
            raw("2025-01-02", "restaurants", "12"),
            raw("2025-01-03", "e-commerce", "30"),
            raw("2025-01-04", "", "4"),
            raw("2025-01-05", "straße", "4"),
        ];

        let once = clean_categories(rows);
        let twice = clean_categories(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once[2].category, "E-Commerce");
    }

    #[test]
    fn test_feature_engineer_derives_fields() {
        let features = feature_engineer(vec![raw("2025-02-14", "Food", "-19.99")]).unwrap();

        let f = &features[0];
        assert_eq!(f.amount, 19.99);
        assert_eq!(f.year, 2025);
        assert_eq!(f.month, "2025-02");
        assert_eq!(f.day, 14);
        assert_eq!(f.weekday, "Friday");
        assert!((f.amount_log - (1.0_f64 + 19.99).ln()).abs() < 1e-12);
        assert_eq!(f.amount_bucket, AmountBucket::Small);
    }

    #[test]
    fn test_feature_engineer_coerces_bad_amounts_to_zero() {
        let features = feature_engineer(vec![
            raw("2025-02-14", "Food", "twelve"),
            raw("2025-02-15", "Food", ""),
        ])
        .unwrap();

        for f in &features {
            assert_eq!(f.amount, 0.0);
            assert_eq!(f.amount_log, 0.0);
            assert_eq!(f.amount_bucket, AmountBucket::VerySmall);
        }
    }

    #[test]
    fn test_feature_engineer_rejects_bad_date() {
        let err = feature_engineer(vec![
            raw("2025-02-14", "Food", "5"),
            raw("14th of Feb", "Food", "5"),
        ])
        .unwrap_err();

        match err {
            Error::InvalidInput(msg) => {
                assert!(msg.contains("row 2"));
                assert!(msg.contains("14th of Feb"));
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_cleaning_before_engineering_merges_synonyms() {
        let csv = "date,category,amount,description\n\
                   2025-01-01,Restaurants,20,Diner\n\
                   2025-01-02,food & drinks,5,Coffee\n\
                   2025-01-03,Food,7,Subway\n";

        let features = preprocess_reader(csv.as_bytes()).unwrap();
        assert!(features.iter().all(|f| f.category == "Food"));
    }
}
