use std::fmt;

use super::error::DashError;
use super::model::{CellValue, Dataset};

/// How a column is filtered and which widgets can use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Temporal,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Temporal => write!(f, "temporal"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Classify a sequence of cells.
///
/// Numeric wins when every non-missing cell is a number (an all-missing
/// column is therefore numeric), then temporal when every non-missing cell
/// is a timestamp. Anything else is categorical.
pub fn classify_values<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> ColumnKind {
    let mut numeric = true;
    let mut temporal = true;
    let mut seen = false;
    for value in values {
        if value.is_missing() {
            continue;
        }
        seen = true;
        numeric &= value.as_f64().is_some();
        temporal &= value.as_timestamp().is_some();
        if !numeric && !temporal {
            return ColumnKind::Categorical;
        }
    }
    if numeric || !seen {
        ColumnKind::Numeric
    } else {
        ColumnKind::Temporal
    }
}

/// Classify the named column of `dataset`.
pub fn classify(dataset: &Dataset, column: &str) -> Result<ColumnKind, DashError> {
    Ok(classify_values(dataset.column_values(column)?))
}

/// Columns whose kind is one of `kinds`, in table order.
pub fn columns_of_kind(dataset: &Dataset, kinds: &[ColumnKind]) -> Vec<String> {
    dataset
        .columns
        .iter()
        .filter(|col| {
            classify(dataset, col)
                .map(|kind| kinds.contains(&kind))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> CellValue {
        CellValue::Timestamp(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    #[test]
    fn numbers_with_gaps_are_numeric() {
        let cells = [CellValue::Integer(1), CellValue::Null, CellValue::Float(2.5)];
        assert_eq!(classify_values(&cells), ColumnKind::Numeric);
    }

    #[test]
    fn all_missing_column_is_numeric() {
        let cells = [CellValue::Null, CellValue::Float(f64::NAN)];
        assert_eq!(classify_values(&cells), ColumnKind::Numeric);
        assert_eq!(classify_values(std::iter::empty()), ColumnKind::Numeric);
    }

    #[test]
    fn dates_are_temporal() {
        let cells = [ts(2024, 1, 1), CellValue::Null, ts(2024, 2, 1)];
        assert_eq!(classify_values(&cells), ColumnKind::Temporal);
    }

    #[test]
    fn mixed_values_fall_back_to_categorical() {
        let cells = [CellValue::Integer(1), CellValue::Text("a".into())];
        assert_eq!(classify_values(&cells), ColumnKind::Categorical);
        let cells = [ts(2024, 1, 1), CellValue::Integer(3)];
        assert_eq!(classify_values(&cells), ColumnKind::Categorical);
    }

    #[test]
    fn classification_is_deterministic() {
        let cells = [CellValue::Text("b".into()), CellValue::Text("a".into())];
        assert_eq!(classify_values(&cells), classify_values(&cells));
    }

    #[test]
    fn unknown_column_is_an_error() {
        let ds = Dataset::default();
        assert!(matches!(classify(&ds, "NOPE"), Err(DashError::UnknownColumn(_))));
    }

    #[test]
    fn columns_of_kind_keeps_table_order() {
        let ds = Dataset::from_rows(
            vec!["name".into(), "b".into(), "a".into()],
            vec![vec![CellValue::Text("x".into()), CellValue::Integer(1), CellValue::Float(0.5)]],
            "-",
        )
        .unwrap();
        assert_eq!(columns_of_kind(&ds, &[ColumnKind::Numeric]), vec!["B", "A"]);
        assert_eq!(
            columns_of_kind(&ds, &[ColumnKind::Numeric, ColumnKind::Categorical]),
            vec!["NAME", "B", "A"]
        );
    }
}
