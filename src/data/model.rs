use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};

use super::error::DashError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes a spreadsheet or
/// CSV column can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Text(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Timestamp(t) if t.time() == NaiveTime::MIN => {
                write!(f, "{}", t.format("%Y-%m-%d"))
            }
            CellValue::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` when it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Missing cells: explicit nulls and NaN floats.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An in-memory table: normalised column names plus row-major cells.
///
/// Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Column names, trimmed and uppercased, unique.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset from raw headers and cells.
    ///
    /// Headers are trimmed and uppercased, rows are padded or truncated to
    /// the header width, and text cells equal to `placeholder` become `0`.
    pub fn from_rows(
        headers: Vec<String>,
        rows: Vec<Vec<CellValue>>,
        placeholder: &str,
    ) -> Result<Self, DashError> {
        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| normalize_header(h, i))
            .collect();

        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.as_str()) {
                return Err(DashError::Parse(format!("duplicate column name: {col}")));
            }
        }

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                for cell in &mut row {
                    if matches!(cell, CellValue::Text(s) if s.trim() == placeholder) {
                        *cell = CellValue::Integer(0);
                    }
                }
                row
            })
            .collect();

        Ok(Dataset { columns, rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the cells of one column in row order.
    pub fn column_values(
        &self,
        name: &str,
    ) -> Result<impl Iterator<Item = &CellValue> + '_, DashError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| DashError::UnknownColumn(name.to_string()))?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// A new dataset containing only the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }
}

fn normalize_header(raw: &str, position: usize) -> String {
    let name = raw.trim().to_uppercase();
    if name.is_empty() {
        format!("COLUMN_{}", position + 1)
    } else {
        name
    }
}
