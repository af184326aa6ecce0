//! Tabular text ingestion.
//!
//! Supported format:
//! - UTF-8, comma-separated
//! - Optional header row (auto-detected: the first row is a header if it
//!   contains any non-numeric, non-empty cell)
//! - Double-quoted fields, including embedded commas and `""` escapes
//! - Blank lines are skipped

use std::path::Path;

use tracing::debug;

use crate::data::dataset::DataSet;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Parses CSV text into a matrix, stripping a header row if present.
pub fn parse_csv(text: &str) -> Result<Matrix> {
    let mut lines = text.lines().enumerate().peekable();

    if let Some((_, first)) = lines.peek() {
        if is_header(first) {
            lines.next();
        }
    }

    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (idx, line) in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let cells = parse_csv_row(line);
        let row = parse_floats(&cells, idx + 1)?;

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(Error::Parse {
                    line: idx + 1,
                    message: format!("expected {} columns, got {}", first.len(), row.len()),
                });
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(Error::Dataset("CSV contains no data rows".into()));
    }

    Matrix::from_rows(rows)
}

pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Matrix> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let table = parse_csv(&text)?;
    debug!(path = %path.as_ref().display(), rows = table.rows(), cols = table.cols(), "read csv");
    Ok(table)
}

/// Reads a CSV file and splits its last `label_size` columns off as labels.
pub fn load_dataset<P: AsRef<Path>>(path: P, label_size: usize) -> Result<DataSet> {
    DataSet::split(&read_csv(path)?, label_size)
}

/// Returns `true` if the row looks like a header (any cell non-numeric).
fn is_header(line: &str) -> bool {
    parse_csv_row(line).iter().any(|c| {
        let t = c.trim();
        !t.is_empty() && t.parse::<f64>().is_err()
    })
}

/// Splits a single CSV row, handling double-quoted fields.
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_floats(cells: &[String], line: usize) -> Result<Vec<f64>> {
    cells
        .iter()
        .map(|c| {
            c.trim().parse::<f64>().map_err(|_| Error::Parse {
                line,
                message: format!("'{}' is not a valid number", c),
            })
        })
        .collect()
}
