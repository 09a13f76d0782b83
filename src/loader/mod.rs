//! Input file loading and cleaning
//!
//! Reads a sales export (CSV or Excel), locates the configured columns,
//! and cleans rows into [`Record`]s. Cleaning drops rather than repairs:
//! a row with an unparseable date, a non-numeric quantity, or a negative
//! unit price is discarded and counted in [`DropStats`]. Negative
//! quantities are kept; they are returns.
//!
//! Both backends reduce rows to the same [`RawRow`] shape, so column
//! resolution and cleaning live here and are shared.

mod csv;
mod sheet;

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::config::{ColumnConfig, Config};
use crate::types::{DropReason, DropStats, LensError, LoadOutcome, Record, Result};

// =============================================================================
// File Format
// =============================================================================

/// Supported input formats, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
}

impl FileFormat {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Ok(Self::Excel),
            "" => Err(LensError::parse(
                path.display().to_string(),
                "file has no extension; expected .csv or an Excel format",
            )),
            other => Err(LensError::parse(
                path.display().to_string(),
                format!("unsupported extension '.{other}'; expected .csv or an Excel format"),
            )),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Load and clean a sales export
pub fn load_file(path: &Path, config: &Config) -> Result<LoadOutcome> {
    let format = FileFormat::from_path(path)?;
    debug!("Loading {} as {:?}", path.display(), format);

    let rows = match format {
        FileFormat::Csv => csv::read_rows(path, &config.columns)?,
        FileFormat::Excel => sheet::read_rows(path, &config.columns)?,
    };

    let outcome = clean_rows(rows, &config.input.date_formats);
    if !outcome.dropped.is_empty() {
        warn!(
            "Dropped {} of {} rows during cleaning",
            outcome.dropped.total(),
            outcome.dropped.total() + outcome.records.len() as u64
        );
    }

    Ok(outcome)
}

// =============================================================================
// Column Resolution
// =============================================================================

/// Positions of the configured columns within a header row
#[derive(Debug, Clone)]
pub(crate) struct ColumnIndices {
    pub date: usize,
    pub quantity: usize,
    pub unit_price: usize,
    pub country: Option<usize>,
    pub description: Option<usize>,
    pub customer_id: Option<usize>,
}

/// Match configured column names against a decoded header row.
///
/// Date, quantity and unit price are required; the first missing one
/// produces a schema error naming it. The rest resolve to `None`.
pub(crate) fn resolve_columns(headers: &[String], columns: &ColumnConfig) -> Result<ColumnIndices> {
    let find = |name: &str| headers.iter().position(|h| h.trim() == name);
    let require = |name: &str| find(name).ok_or_else(|| LensError::schema(name));

    Ok(ColumnIndices {
        date: require(&columns.date)?,
        quantity: require(&columns.quantity)?,
        unit_price: require(&columns.unit_price)?,
        country: find(&columns.country),
        description: find(&columns.description),
        customer_id: find(&columns.customer_id),
    })
}

// =============================================================================
// Raw Rows
// =============================================================================

/// A cell value before cleaning, as close to the file as each backend gets
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawValue {
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
    Empty,
}

/// One file row reduced to the columns the pipeline cares about
#[derive(Debug, Clone)]
pub(crate) struct RawRow {
    pub date: RawValue,
    pub quantity: RawValue,
    pub unit_price: RawValue,
    pub country: Option<String>,
    pub description: Option<String>,
    pub customer_id: Option<String>,
}

impl RawRow {
    /// Whether every cell of interest is empty. Spreadsheets commonly pad
    /// their used range with such rows; they are skipped, not counted.
    fn is_blank(&self) -> bool {
        self.date == RawValue::Empty
            && self.quantity == RawValue::Empty
            && self.unit_price == RawValue::Empty
            && self.country.is_none()
            && self.description.is_none()
            && self.customer_id.is_none()
    }
}

// =============================================================================
// Cleaning
// =============================================================================

/// Clean raw rows into records, counting what gets dropped.
///
/// Checks run in field order: date first, then quantity, then price. A row
/// is counted once, under the first check it fails.
pub(crate) fn clean_rows(rows: Vec<RawRow>, date_formats: &[String]) -> LoadOutcome {
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = DropStats::default();

    for row in rows {
        if row.is_blank() {
            continue;
        }

        let Some(date) = parse_date(&row.date, date_formats) else {
            dropped.record(DropReason::BadDate);
            continue;
        };

        let Some(quantity) = parse_quantity(&row.quantity) else {
            dropped.record(DropReason::BadQuantity);
            continue;
        };

        let unit_price = match parse_price(&row.unit_price) {
            Some(p) if p >= 0.0 => p,
            Some(_) => {
                dropped.record(DropReason::NegativePrice);
                continue;
            }
            None => {
                dropped.record(DropReason::BadPrice);
                continue;
            }
        };

        records.push(Record {
            date,
            quantity,
            unit_price,
            country: row.country,
            description: row.description,
            customer_id: row.customer_id,
        });
    }

    LoadOutcome { records, dropped }
}

/// Parse a date cell, trying each configured format in order.
/// Date-only formats parse to midnight.
fn parse_date(value: &RawValue, formats: &[String]) -> Option<NaiveDateTime> {
    match value {
        RawValue::DateTime(dt) => Some(*dt),
        RawValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            formats.iter().find_map(|fmt| {
                NaiveDateTime::parse_from_str(s, fmt).ok().or_else(|| {
                    NaiveDate::parse_from_str(s, fmt)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
            })
        }
        _ => None,
    }
}

/// Parse a quantity cell. Accepts integer text, integral float text
/// ("6.0"), and integral numeric cells.
fn parse_quantity(value: &RawValue) -> Option<i64> {
    match value {
        RawValue::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        RawValue::Number(f) => integral(*f),
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then(|| f as i64)
}

/// Parse a unit price cell into a finite number
fn parse_price(value: &RawValue) -> Option<f64> {
    let parsed = match value {
        RawValue::Text(s) => s.trim().parse::<f64>().ok(),
        RawValue::Number(f) => Some(*f),
        _ => None,
    };
    parsed.filter(|p| p.is_finite())
}

// =============================================================================
// Tests
// =============================================================================
