//! Integration tests for spendlens-core
//!
//! These tests exercise the full load → features → aggregates → insights
//! workflow through the public API.

use std::io::Write;

use spendlens_core::{
    analyze, clean_categories, compare_last_two_months, detect_anomalies, generate_insights,
    load_transactions, preprocess_pipeline, preprocess_reader, train_kmeans, AmountBucket,
    AnalysisConfig, AnomalyAssignment, Error,
};
use tempfile::NamedTempFile;

/// Ten transactions over two months. "Gifts" only appears in February.
fn two_month_csv() -> &'static str {
    "date,category,amount,description
2025-01-03,food,12.50,Lunch
2025-01-09, Restaurants ,30.00,Dinner out
2025-01-14,bills,80.00,Electricity
2025-01-21,transport,15.00,Train pass
2025-01-28,Food,9.99,Groceries
2025-02-02,food,14.00,Lunch
2025-02-07,Bills,85.00,Electricity
2025-02-11,Transport,15.00,Train pass
2025-02-19,gifts,30.00,Birthday present
2025-02-25,Food,-21.00,Groceries refund"
}

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write CSV");
    file
}

// =============================================================================
// Feature Pipeline Tests
// =============================================================================

#[test]
fn test_pipeline_from_file() {
    let file = write_csv(two_month_csv());
    let features = preprocess_pipeline(file.path()).expect("Pipeline failed");

    assert_eq!(features.len(), 10);
    for f in &features {
        assert!(f.amount >= 0.0);
        assert!((f.amount_log - f.amount.ln_1p()).abs() < 1e-12);
        assert_eq!(f.amount_bucket, AmountBucket::from_amount(f.amount));
    }

    // Sign dropped, labels normalized and merged
    assert_eq!(features[9].amount, 21.0);
    assert_eq!(features[1].category, "Food");
    assert_eq!(features[2].category, "Bills");
    assert_eq!(features[0].month, "2025-01");
    assert_eq!(features[0].weekday, "Friday");
}

#[test]
fn test_cleaning_is_idempotent() {
    let file = write_csv(two_month_csv());
    let rows = load_transactions(file.path()).unwrap();

    let once = clean_categories(rows);
    let twice = clean_categories(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn test_missing_column_is_invalid_input() {
    let file = write_csv("date,category,description\n2025-01-03,Food,Lunch\n");
    let err = preprocess_pipeline(file.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("amount")));
}

#[test]
fn test_bad_date_aborts_pipeline() {
    let csv = "date,category,amount,description\nnot-a-date,Food,3.00,Coffee\n";
    assert!(matches!(
        preprocess_reader(csv.as_bytes()),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_unparsable_amount_becomes_zero() {
    let csv = "date,category,amount,description\n2025-01-03,Food,n/a,Coffee\n";
    let features = preprocess_reader(csv.as_bytes()).unwrap();
    assert_eq!(features[0].amount, 0.0);
    assert_eq!(features[0].amount_log, 0.0);
    assert_eq!(features[0].amount_bucket, AmountBucket::VerySmall);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = preprocess_pipeline("/nonexistent/ledger.csv").unwrap_err();
    assert!(matches!(err, Error::Io(_) | Error::Csv(_)));
}

// =============================================================================
// Aggregate and Insight Tests
// =============================================================================

#[test]
fn test_new_category_end_to_end() {
    let features = preprocess_reader(two_month_csv().as_bytes()).unwrap();

    let changes = compare_last_two_months(&features);
    let gifts = changes.iter().find(|c| c.category == "Gifts").unwrap();
    assert_eq!(gifts.change_pct, f64::INFINITY);
    assert!(gifts.note.contains("new spending"));
    assert!(gifts.note.contains("30.00"));

    let empty: Vec<AnomalyAssignment> = vec![];
    let insights = generate_insights(&features, Some(&empty), 10.0);

    assert!(insights
        .iter()
        .any(|s| s == "Total spending in last month (2025-02): 165.00"));
    assert!(insights
        .iter()
        .any(|s| s == "New spending in Gifts: 30.00 (no spending last month)."));
    assert!(!insights.iter().any(|s| s.starts_with("Detected")));
}

#[test]
fn test_single_month_has_no_change_statement() {
    let csv = "date,category,amount,description
2025-03-01,Food,10.00,a
2025-03-02,Bills,50.00,b
2025-03-03,Food,5.00,c";
    let features = preprocess_reader(csv.as_bytes()).unwrap();
    let insights = generate_insights(&features, None, 10.0);

    assert!(!insights.iter().any(|s| s.contains("previous month")));
    assert!(!insights.iter().any(|s| s.contains("inf") || s.contains("NaN")));
    assert_eq!(insights.len(), 2);
}

#[test]
fn test_huge_amounts_never_print_non_finite_numbers() {
    let csv = "date,category,amount,description
2025-01-03,Food,1e308,a
2025-01-04,Food,1e308,b
2025-02-03,Food,1e308,c
2025-02-04,Food,1e308,d
2025-02-05,Food,12.00,e";
    let features = preprocess_reader(csv.as_bytes()).unwrap();
    assert!(features.iter().all(|f| f.amount.is_finite()));

    let insights = generate_insights(&features, None, 10.0);
    assert!(!insights.is_empty());
    for s in &insights {
        assert!(!s.contains("inf") && !s.contains("NaN"), "{}", s);
    }
    assert_eq!(
        insights[0],
        "Total spending in last month (2025-02): 12.00"
    );
}

// =============================================================================
// Model Stage Tests
// =============================================================================

#[test]
fn test_models_are_reproducible() {
    let features = preprocess_reader(two_month_csv().as_bytes()).unwrap();

    let (_, a) = train_kmeans(&features, 3, 42).unwrap();
    let (_, b) = train_kmeans(&features, 3, 42).unwrap();
    assert_eq!(a, b);

    let (_, x) = detect_anomalies(&features, 0.1).unwrap();
    let (_, y) = detect_anomalies(&features, 0.1).unwrap();
    let flagged = |v: &[AnomalyAssignment]| -> Vec<bool> { v.iter().map(|a| a.is_anomaly).collect() };
    assert_eq!(flagged(&x), flagged(&y));
}

#[test]
fn test_analyze_report_from_csv() {
    let file = write_csv(two_month_csv());
    let features = preprocess_pipeline(file.path()).unwrap();

    let report = analyze(&features, &AnalysisConfig::default()).unwrap();
    assert_eq!(report.transaction_count, 10);
    assert_eq!(report.monthly.len(), 2);
    assert!(report.clusters.completed().is_some());
    assert!(report.anomalies.completed().is_some());
    assert_eq!(
        report.insights.first().map(String::as_str),
        Some("Total spending in last month (2025-02): 165.00")
    );
}

#[test]
fn test_analyze_tolerates_tiny_ledgers() {
    let csv = "date,category,amount,description\n2025-01-03,Food,4.00,Coffee\n";
    let features = preprocess_reader(csv.as_bytes()).unwrap();

    let report = analyze(&features, &AnalysisConfig::default()).unwrap();
    assert!(report.clusters.is_skipped());
    assert!(report.anomalies.is_skipped());
    assert_eq!(
        report.insights,
        vec![
            "Total spending in last month (2025-01): 4.00",
            "Top categories overall: Food (4)",
        ]
    );
}
