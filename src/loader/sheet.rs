//! Excel backend
//!
//! Reads the first worksheet of an Excel workbook through calamine. The
//! first row is the header row. Date-formatted cells arrive already
//! parsed; text cells in the date column go through the same format list
//! as CSV input.

use std::path::Path;

use calamine::{Data, DataType, Reader, open_workbook_auto};

use super::{ColumnIndices, RawRow, RawValue, resolve_columns};
use crate::config::ColumnConfig;
use crate::types::{LensError, Result};

/// Read the first worksheet into raw rows
pub(crate) fn read_rows(path: &Path, columns: &ColumnConfig) -> Result<Vec<RawRow>> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| {
            LensError::parse(path.display().to_string(), "workbook has no sheets")
        })?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .map(|row| {
            row.iter()
                .map(|cell| cell.as_string().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    let indices = resolve_columns(&headers, columns)?;

    Ok(rows_iter.map(|row| to_raw_row(row, &indices)).collect())
}

fn to_raw_row(row: &[Data], indices: &ColumnIndices) -> RawRow {
    RawRow {
        date: date_cell(row.get(indices.date)),
        quantity: numeric_cell(row.get(indices.quantity)),
        unit_price: numeric_cell(row.get(indices.unit_price)),
        country: text_cell(indices.country.and_then(|i| row.get(i))),
        description: text_cell(indices.description.and_then(|i| row.get(i))),
        customer_id: text_cell(indices.customer_id.and_then(|i| row.get(i))),
    }
}

/// Date column cell. Only date-typed and text cells qualify; a bare
/// serial number without date formatting stays ambiguous and is dropped
/// downstream.
fn date_cell(cell: Option<&Data>) -> RawValue {
    match cell {
        Some(Data::String(s)) if !s.trim().is_empty() => RawValue::Text(s.clone()),
        Some(c @ (Data::DateTime(_) | Data::DateTimeIso(_))) => c
            .as_datetime()
            .map(RawValue::DateTime)
            .unwrap_or(RawValue::Empty),
        _ => RawValue::Empty,
    }
}

fn numeric_cell(cell: Option<&Data>) -> RawValue {
    match cell {
        Some(Data::Int(i)) => RawValue::Number(*i as f64),
        Some(Data::Float(f)) => RawValue::Number(*f),
        Some(Data::String(s)) if !s.trim().is_empty() => RawValue::Text(s.clone()),
        _ => RawValue::Empty,
    }
}

/// Optional text cell. Integral floats read back without a trailing
/// fraction, so numeric customer IDs match their CSV spelling.
fn text_cell(cell: Option<&Data>) -> Option<String> {
    let value = cell?.as_string()?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
