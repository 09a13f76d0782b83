//! CSV backend
//!
//! Reads byte records and decodes cells lossily, so latin1 exports (the
//! usual encoding for legacy retail dumps) load without a transcoding
//! step. Non-UTF-8 bytes degrade to replacement characters in text
//! fields; the numeric and date columns are plain ASCII either way.

use std::fs::File;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, Trim};

use super::{ColumnIndices, RawRow, RawValue, resolve_columns};
use crate::config::ColumnConfig;
use crate::types::Result;

/// Read a CSV file into raw rows
pub(crate) fn read_rows(path: &Path, columns: &ColumnConfig) -> Result<Vec<RawRow>> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    let indices = resolve_columns(&headers, columns)?;

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        rows.push(to_raw_row(&record, &indices));
    }

    Ok(rows)
}

fn to_raw_row(record: &ByteRecord, indices: &ColumnIndices) -> RawRow {
    RawRow {
        date: cell(record, indices.date),
        quantity: cell(record, indices.quantity),
        unit_price: cell(record, indices.unit_price),
        country: text_cell(record, indices.country),
        description: text_cell(record, indices.description),
        customer_id: text_cell(record, indices.customer_id),
    }
}

fn cell(record: &ByteRecord, index: usize) -> RawValue {
    match record.get(index) {
        Some(bytes) if !bytes.is_empty() => {
            RawValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
        _ => RawValue::Empty,
    }
}

fn text_cell(record: &ByteRecord, index: Option<usize>) -> Option<String> {
    let bytes = record.get(index?)?;
    if bytes.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(bytes).into_owned())
}
