use std::collections::HashSet;

use chrono::NaiveDate;

use super::classify::ColumnKind;
use super::error::DashError;
use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Domain: what the range widgets may offer for a timeline column
// ---------------------------------------------------------------------------

/// The span of values a timeline column covers.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDomain {
    Numeric { min: f64, max: f64 },
    Temporal { min: NaiveDate, max: NaiveDate },
    /// Distinct string-coerced values in first-occurrence order.
    Categorical { values: Vec<String> },
    /// The column holds no non-missing value.
    Empty,
}

/// Compute the domain of `column` for the given kind.
pub fn column_domain(
    dataset: &Dataset,
    column: &str,
    kind: ColumnKind,
) -> Result<ColumnDomain, DashError> {
    let values = dataset.column_values(column)?.filter(|v| !v.is_missing());

    let domain = match kind {
        ColumnKind::Numeric => values
            .filter_map(CellValue::as_f64)
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .map(|(min, max)| ColumnDomain::Numeric { min, max }),
        ColumnKind::Temporal => values
            .filter_map(CellValue::as_timestamp)
            .map(|t| t.date())
            .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
            .map(|(min, max)| ColumnDomain::Temporal { min, max }),
        ColumnKind::Categorical => {
            let mut seen = HashSet::new();
            let distinct: Vec<String> = values
                .map(ToString::to_string)
                .filter(|s| seen.insert(s.clone()))
                .collect();
            (!distinct.is_empty()).then_some(ColumnDomain::Categorical { values: distinct })
        }
    };

    Ok(domain.unwrap_or(ColumnDomain::Empty))
}

// ---------------------------------------------------------------------------
// Selection: the user's start / end bounds
// ---------------------------------------------------------------------------

/// A pair of range bounds in the domain of the timeline column.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeSelection {
    Numeric { start: f64, end: f64 },
    Temporal { start: NaiveDate, end: NaiveDate },
    /// Bounds are chosen by value from the distinct-value list.
    Categorical { start: String, end: String },
}

impl RangeSelection {
    /// Bounds covering the whole domain, `None` for an empty column.
    pub fn full(domain: &ColumnDomain) -> Option<Self> {
        match domain {
            ColumnDomain::Numeric { min, max } => Some(RangeSelection::Numeric {
                start: *min,
                end: *max,
            }),
            ColumnDomain::Temporal { min, max } => Some(RangeSelection::Temporal {
                start: *min,
                end: *max,
            }),
            ColumnDomain::Categorical { values } => Some(RangeSelection::Categorical {
                start: values.first()?.clone(),
                end: values.last()?.clone(),
            }),
            ColumnDomain::Empty => None,
        }
    }

    /// Clamp numeric and temporal bounds into the domain. Ordering is left
    /// alone so [`resolve`] can still reject reversed bounds.
    pub fn clamp(self, domain: &ColumnDomain) -> Self {
        match (self, domain) {
            (RangeSelection::Numeric { start, end }, ColumnDomain::Numeric { min, max }) => {
                RangeSelection::Numeric {
                    start: start.clamp(*min, *max),
                    end: end.clamp(*min, *max),
                }
            }
            (RangeSelection::Temporal { start, end }, ColumnDomain::Temporal { min, max }) => {
                RangeSelection::Temporal {
                    start: start.clamp(*min, *max),
                    end: end.clamp(*min, *max),
                }
            }
            (other, _) => other,
        }
    }

    fn kind(&self) -> ColumnKind {
        match self {
            RangeSelection::Numeric { .. } => ColumnKind::Numeric,
            RangeSelection::Temporal { .. } => ColumnKind::Temporal,
            RangeSelection::Categorical { .. } => ColumnKind::Categorical,
        }
    }
}

// ---------------------------------------------------------------------------
// Predicate: which rows survive the range
// ---------------------------------------------------------------------------

/// A resolved, inclusive row predicate over the timeline column.
#[derive(Debug, Clone, PartialEq)]
pub enum RangePredicate {
    /// Matches no row (empty table or all-missing column).
    Nothing,
    Numeric { start: f64, end: f64 },
    /// Compared at date granularity; time of day is ignored.
    Temporal { start: NaiveDate, end: NaiveDate },
    Categorical { allowed: HashSet<String> },
}

impl RangePredicate {
    /// Whether a timeline cell lies inside the range. Missing cells never do.
    pub fn matches(&self, value: &CellValue) -> bool {
        if value.is_missing() {
            return false;
        }
        match self {
            RangePredicate::Nothing => false,
            RangePredicate::Numeric { start, end } => value
                .as_f64()
                .is_some_and(|v| *start <= v && v <= *end),
            RangePredicate::Temporal { start, end } => value
                .as_timestamp()
                .is_some_and(|t| (*start..=*end).contains(&t.date())),
            RangePredicate::Categorical { allowed } => allowed.contains(&value.to_string()),
        }
    }
}

/// Turn a selection into a row predicate for `column`.
///
/// Numeric and temporal bounds must satisfy `start <= end`; categorical
/// bounds are mapped to positions in the distinct-value list and swapped
/// when reversed.
pub fn resolve(
    dataset: &Dataset,
    column: &str,
    kind: ColumnKind,
    selection: &RangeSelection,
) -> Result<RangePredicate, DashError> {
    if selection.kind() != kind {
        return Err(DashError::InvalidRange(format!(
            "{} bounds given for {kind} column {column}",
            selection.kind()
        )));
    }

    match selection {
        RangeSelection::Numeric { start, end } if start > end || start.is_nan() || end.is_nan() => {
            return Err(DashError::InvalidRange(format!(
                "start {start} is greater than end {end}"
            )));
        }
        RangeSelection::Temporal { start, end } if start > end => {
            return Err(DashError::InvalidRange(format!(
                "start date {start} is after end date {end}"
            )));
        }
        _ => {}
    }

    let domain = column_domain(dataset, column, kind)?;

    let predicate = match (selection, domain) {
        (_, ColumnDomain::Empty) => RangePredicate::Nothing,
        (RangeSelection::Numeric { start, end }, _) => RangePredicate::Numeric {
            start: *start,
            end: *end,
        },
        (RangeSelection::Temporal { start, end }, _) => RangePredicate::Temporal {
            start: *start,
            end: *end,
        },
        (RangeSelection::Categorical { start, end }, ColumnDomain::Categorical { values }) => {
            let last = values.len() - 1;
            let mut start_idx = position_or(&values, start, 0, column);
            let mut end_idx = position_or(&values, end, last, column);
            if start_idx > end_idx {
                std::mem::swap(&mut start_idx, &mut end_idx);
            }
            RangePredicate::Categorical {
                allowed: values[start_idx..=end_idx].iter().cloned().collect(),
            }
        }
        // Selection and column kinds agree past the check above.
        _ => RangePredicate::Nothing,
    };
    Ok(predicate)
}

fn position_or(values: &[String], wanted: &str, fallback: usize, column: &str) -> usize {
    values.iter().position(|v| v == wanted).unwrap_or_else(|| {
        log::warn!("Value {wanted:?} not found in column {column}, using {:?}", values[fallback]);
        fallback
    })
}

/// Build the filtered dataset: rows whose `column` cell matches `predicate`.
pub fn apply(
    dataset: &Dataset,
    column: &str,
    predicate: &RangePredicate,
) -> Result<Dataset, DashError> {
    let indices: Vec<usize> = dataset
        .column_values(column)?
        .enumerate()
        .filter(|(_, value)| predicate.matches(value))
        .map(|(i, _)| i)
        .collect();
    Ok(dataset.select_rows(&indices))
}
