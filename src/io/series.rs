//! External monthly series loader.
//!
//! Electricity prices and GPU price overrides arrive as flat CSVs written by
//! the fetch collaborators. This module only turns them into raw records; date
//! normalization and gap filling belong to `reconcile`.
//!
//! Policy (`skip-on-shape-mismatch`): a file that is missing, empty, unreadable
//! or lacks a required column is never an error. The caller receives
//! `SeriesSource::Skipped` (or `Absent`) and the grid defaults stand.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Cell;
use crate::error::ShapeMismatch;

/// One data row of an external series, still untyped.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRecord {
    /// 1-based line number in the source file.
    pub line: usize,
    pub date_raw: String,
    /// One cell per requested value column, in request order.
    pub values: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalTable {
    /// Requested value columns; `SeriesRecord::values` follows this order.
    pub value_columns: Vec<String>,
    pub records: Vec<SeriesRecord>,
}

impl ExternalTable {
    /// Position of `name` within each record's `values`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.value_columns.iter().position(|c| c == name)
    }
}

/// Outcome of trying to load an optional external table.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesSource {
    Loaded(ExternalTable),
    /// The file exists but cannot be used.
    Skipped(ShapeMismatch),
    /// No file at the configured path.
    Absent,
}

/// Load an optional series CSV with a `date` column plus `value_columns`.
///
/// Column names must match exactly, apart from surrounding whitespace and a
/// leading BOM. Extra columns are ignored.
pub fn load_series(path: Option<&Path>, value_columns: &[&str]) -> SeriesSource {
    let Some(path) = path else {
        return SeriesSource::Absent;
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "external series not found");
        return SeriesSource::Absent;
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => return SeriesSource::Skipped(ShapeMismatch::Unreadable(e.to_string())),
    };
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    read_series(reader, value_columns)
}

/// Same as [`load_series`] but from any reader.
pub fn read_series<R: std::io::Read>(mut reader: csv::Reader<R>, value_columns: &[&str]) -> SeriesSource {
    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => return SeriesSource::Skipped(ShapeMismatch::Unreadable(e.to_string())),
    };
    if headers.iter().all(|h| h.trim().is_empty()) {
        return SeriesSource::Skipped(ShapeMismatch::Empty);
    }
    let header_map = build_header_map(&headers);

    let date_idx = match header_map.get("date") {
        Some(idx) => *idx,
        None => return SeriesSource::Skipped(ShapeMismatch::MissingColumn("date".to_string())),
    };
    let mut value_idx = Vec::with_capacity(value_columns.len());
    for name in value_columns {
        match header_map.get(&normalize_header_name(name)) {
            Some(idx) => value_idx.push(*idx),
            None => return SeriesSource::Skipped(ShapeMismatch::MissingColumn((*name).to_string())),
        }
    }

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; lines are 1-based.
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(line, error = %e, "skipping unparseable CSV row");
                continue;
            }
        };

        let field = |i: usize| record.get(i).unwrap_or("");
        records.push(SeriesRecord {
            line,
            date_raw: field(date_idx).to_string(),
            values: value_idx.iter().map(|&i| Cell::from_raw(field(i))).collect(),
        });
    }

    if records.is_empty() {
        return SeriesSource::Skipped(ShapeMismatch::Empty);
    }

    SeriesSource::Loaded(ExternalTable {
        value_columns: value_columns.iter().map(|s| (*s).to_string()).collect(),
        records,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins on duplicate headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}
