//! CSV import for transaction ledgers
//!
//! Expected header: `date,category,amount,description` in any order.
//! Extra columns are ignored; a missing required column is fatal.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::RawTransaction;

const REQUIRED_COLUMNS: [&str; 4] = ["date", "category", "amount", "description"];

/// Positions of the required columns within a header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    category: usize,
    amount: usize,
    description: usize,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| Error::InvalidInput(format!("Missing required column: {}", name)))
        };

        Ok(Self {
            date: find(REQUIRED_COLUMNS[0])?,
            category: find(REQUIRED_COLUMNS[1])?,
            amount: find(REQUIRED_COLUMNS[2])?,
            description: find(REQUIRED_COLUMNS[3])?,
        })
    }
}

/// Load a transaction ledger from a CSV file
pub fn load_transactions(path: impl AsRef<Path>) -> Result<Vec<RawTransaction>> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading transactions");
    let file = File::open(path)?;
    read_transactions(file)
}

/// Read a transaction ledger from any CSV source
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(rdr.headers()?)?;
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();

        rows.push(RawTransaction {
            date: field(columns.date),
            category: field(columns.category),
            amount: field(columns.amount),
            description: field(columns.description),
        });
    }

    debug!("Read {} transaction rows", rows.len());
    Ok(rows)
}

/// Parse an ISO-8601 date, keeping only the calendar date when a time is attached
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    let datetime_formats = [
        "%Y-%m-%dT%H:%M:%S%.f", // 2025-01-15T08:30:00
        "%Y-%m-%d %H:%M:%S%.f", // 2025-01-15 08:30:00
        "%Y-%m-%dT%H:%M",       // 2025-01-15T08:30
        "%Y-%m-%d %H:%M",       // 2025-01-15 08:30
    ];

    datetime_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Largest magnitude accepted as an amount
///
/// Far beyond any real ledger entry, and small enough that sums over any
/// realistic number of rows stay finite.
pub const MAX_AMOUNT: f64 = 1e15;

/// Coerce an amount to a non-negative number
///
/// Anything unparsable, non-finite or larger than [`MAX_AMOUNT`] becomes 0.
pub(crate) fn coerce_amount(s: &str) -> f64 {
    match s.trim().parse::<f64>() {
        Ok(v) if v.abs() <= MAX_AMOUNT => v.abs(),
        _ => 0.0,
    }
}
