use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::classify::ColumnKind;
use super::error::DashError;
use super::model::{CellValue, Dataset};
use super::range::{column_domain, ColumnDomain};
use super::selection::ViewSelection;

// ---------------------------------------------------------------------------
// Scalar reductions
// ---------------------------------------------------------------------------

/// Sum of the numeric cells of `column`; `0.0` when there are none.
pub fn kpi_sum(dataset: &Dataset, column: &str) -> Result<f64, DashError> {
    Ok(dataset
        .column_values(column)?
        .filter(|v| !v.is_missing())
        .filter_map(CellValue::as_f64)
        .sum())
}

/// Pearson correlation over the rows where both columns hold a number.
///
/// Undefined with fewer than two such rows or when either column is
/// constant over them.
pub fn correlation(dataset: &Dataset, a: &str, b: &str) -> Result<f64, DashError> {
    let pairs: Vec<(f64, f64)> = numeric_pairs(dataset, a, b)?;
    let undefined = |reason: &str| DashError::UndefinedStatistic {
        name: format!("correlation of {a} and {b}"),
        reason: reason.to_string(),
    };

    if pairs.len() < 2 {
        return Err(undefined("fewer than two complete rows"));
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let constant_a = pairs.iter().all(|(x, _)| *x == pairs[0].0);
    let constant_b = pairs.iter().all(|(_, y)| *y == pairs[0].1);
    if constant_a || constant_b || var_a == 0.0 || var_b == 0.0 {
        return Err(undefined("zero variance"));
    }

    Ok((cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0))
}

/// Occurrences of each distinct value of `column`, most frequent first.
///
/// Missing cells are not counted. Ties keep first-occurrence order.
pub fn frequency_counts(dataset: &Dataset, column: &str) -> Result<Vec<(String, usize)>, DashError> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in dataset.column_values(column)?.filter(|v| !v.is_missing()) {
        let label = value.to_string();
        match counts.get_mut(&label) {
            Some(count) => *count += 1,
            None => {
                counts.insert(label.clone(), 1);
                order.push(label);
            }
        }
    }

    let mut buckets: Vec<(String, usize)> = order
        .into_iter()
        .map(|label| {
            let count = counts[&label];
            (label, count)
        })
        .collect();
    // Stable sort preserves first-occurrence order between equal counts.
    buckets.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(buckets)
}

fn numeric_pairs(dataset: &Dataset, a: &str, b: &str) -> Result<Vec<(f64, f64)>, DashError> {
    Ok(dataset
        .column_values(a)?
        .zip(dataset.column_values(b)?)
        .filter_map(|(x, y)| Some((numeric(x)?, numeric(y)?)))
        .collect())
}

fn numeric(value: &CellValue) -> Option<f64> {
    value.as_f64().filter(|v| !v.is_nan())
}

// ---------------------------------------------------------------------------
// Presentation payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationCard {
    pub a: String,
    pub b: String,
    /// `None` when the coefficient is undefined.
    pub value: Option<f64>,
}

impl CorrelationCard {
    pub fn label(&self) -> String {
        format!("Correlation {} & {}", self.a, self.b)
    }

    /// Two decimals, or `N/A` when undefined.
    pub fn display_value(&self) -> String {
        match self.value {
            Some(v) => format!("{v:.2}"),
            None => "N/A".to_string(),
        }
    }
}

/// One named line of a line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_column: String,
    /// How x coordinates were derived from the timeline column.
    pub x_kind: ColumnKind,
    /// Category labels indexed by x position (categorical timelines only).
    pub x_labels: Vec<String>,
    pub series: Vec<Series>,
}

impl LineChart {
    /// Axis label for an x coordinate: a date for temporal timelines, the
    /// category at that position for categorical ones.
    pub fn x_label(&self, x: f64) -> String {
        match self.x_kind {
            ColumnKind::Numeric => format_tick(x),
            ColumnKind::Temporal => chrono::DateTime::from_timestamp((x * 86_400.0).round() as i64, 0)
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            ColumnKind::Categorical => {
                let pos = x.round();
                if (x - pos).abs() > 1e-6 || pos < 0.0 {
                    return String::new();
                }
                self.x_labels.get(pos as usize).cloned().unwrap_or_default()
            }
        }
    }
}

/// Six decimals at most, trailing zeros dropped.
fn format_tick(x: f64) -> String {
    let text = format!("{x:.6}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPlot {
    pub title: String,
    pub x_column: String,
    pub y_column: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    /// Fraction of all counted rows, in `[0, 1]`.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub column: String,
    pub slices: Vec<PieSlice>,
}

/// Everything the presentation layer draws for one filtered dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedViews {
    /// Empty when no numeric column is available.
    pub kpis: Vec<KpiCard>,
    pub correlation: Option<CorrelationCard>,
    pub line: Option<LineChart>,
    pub scatter: Option<ScatterPlot>,
    pub pie: Option<PieChart>,
}

/// Days since the Unix epoch, fractional for times of day.
pub fn timestamp_to_x(t: NaiveDateTime) -> f64 {
    t.and_utc().timestamp() as f64 / 86_400.0
}

/// Line series of `y_columns` against the timeline column, in row order.
/// Repeated y columns are drawn once.
pub fn line_chart(
    dataset: &Dataset,
    timeline: &str,
    kind: ColumnKind,
    y_columns: &[String],
) -> Result<LineChart, DashError> {
    let x_labels = match column_domain(dataset, timeline, kind)? {
        ColumnDomain::Categorical { values } => values,
        _ => Vec::new(),
    };
    let xs: Vec<Option<f64>> = dataset
        .column_values(timeline)?
        .map(|v| {
            if v.is_missing() {
                return None;
            }
            match kind {
                ColumnKind::Numeric => numeric(v),
                ColumnKind::Temporal => v.as_timestamp().map(timestamp_to_x),
                ColumnKind::Categorical => {
                    let label = v.to_string();
                    x_labels.iter().position(|l| *l == label).map(|i| i as f64)
                }
            }
        })
        .collect();

    let mut names: Vec<&String> = Vec::new();
    for name in y_columns {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    let series = names
        .iter()
        .map(|name| -> Result<Series, DashError> {
            let points = xs
                .iter()
                .zip(dataset.column_values(name)?)
                .filter_map(|(x, y)| Some([(*x)?, numeric(y)?]))
                .collect();
            Ok(Series {
                name: (*name).clone(),
                points,
            })
        })
        .collect::<Result<Vec<_>, DashError>>()?;

    Ok(LineChart {
        title: format!(
            "Line Chart of {}",
            names.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
        ),
        x_column: timeline.to_string(),
        x_kind: kind,
        x_labels,
        series,
    })
}

pub fn scatter_plot(dataset: &Dataset, x: &str, y: &str) -> Result<ScatterPlot, DashError> {
    Ok(ScatterPlot {
        title: format!("Scatterplot of {x}, {y}"),
        x_column: x.to_string(),
        y_column: y.to_string(),
        points: numeric_pairs(dataset, x, y)?
            .into_iter()
            .map(|(a, b)| [a, b])
            .collect(),
    })
}

pub fn pie_chart(dataset: &Dataset, column: &str) -> Result<PieChart, DashError> {
    let buckets = frequency_counts(dataset, column)?;
    let total: usize = buckets.iter().map(|(_, c)| c).sum();
    let slices = buckets
        .into_iter()
        .map(|(label, count)| PieSlice {
            label,
            count,
            share: count as f64 / total as f64,
        })
        .collect();
    Ok(PieChart {
        title: format!("Pie Chart of {column}"),
        column: column.to_string(),
        slices,
    })
}

/// Derive every view from the filtered dataset.
pub fn build_views(
    filtered: &Dataset,
    timeline: &str,
    kind: ColumnKind,
    selection: &ViewSelection,
) -> Result<DerivedViews, DashError> {
    let mut views = DerivedViews::default();

    if let Some(numeric) = &selection.numeric {
        views.kpis = numeric
            .kpis
            .iter()
            .map(|col| -> Result<KpiCard, DashError> {
                Ok(KpiCard {
                    label: col.clone(),
                    value: kpi_sum(filtered, col)?,
                })
            })
            .collect::<Result<Vec<_>, DashError>>()?;

        let (a, b) = &numeric.correlation;
        let value = match correlation(filtered, a, b) {
            Ok(v) => Some(v),
            Err(e @ DashError::UndefinedStatistic { .. }) => {
                log::debug!("{e}");
                None
            }
            Err(e) => return Err(e),
        };
        views.correlation = Some(CorrelationCard {
            a: a.clone(),
            b: b.clone(),
            value,
        });

        views.line = Some(line_chart(filtered, timeline, kind, &numeric.line)?);
        views.scatter = Some(scatter_plot(filtered, &numeric.scatter.0, &numeric.scatter.1)?);
    }

    if let Some(col) = &selection.pie {
        views.pie = Some(pie_chart(filtered, col)?);
    }

    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::selection::NumericSelection;

    fn dataset(headers: &[&str], rows: Vec<Vec<CellValue>>) -> Dataset {
        Dataset::from_rows(headers.iter().map(|h| h.to_string()).collect(), rows, "-").unwrap()
    }

    fn ints(values: &[i64]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::Integer(*v)).collect()
    }

    fn column(name: &str, cells: Vec<CellValue>) -> Dataset {
        dataset(&[name], cells.into_iter().map(|c| vec![c]).collect())
    }

    #[test]
    fn kpi_sum_skips_missing_and_is_zero_when_empty() {
        let ds = column("V", vec![CellValue::Integer(10), CellValue::Null, CellValue::Float(2.5)]);
        assert_eq!(kpi_sum(&ds, "V").unwrap(), 12.5);
        assert_eq!(kpi_sum(&column("V", vec![]), "V").unwrap(), 0.0);
    }

    #[test]
    fn correlation_with_itself_is_one() {
        let ds = dataset(
            &["A", "B"],
            vec![ints(&[1, 1]), ints(&[2, 2]), ints(&[4, 4]), ints(&[7, 7])],
        );
        let r = correlation(&ds, "A", "A").unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn correlation_of_opposite_columns_is_minus_one() {
        let ds = dataset(&["A", "B"], vec![ints(&[1, 3]), ints(&[2, 2]), ints(&[3, 1])]);
        let r = correlation(&ds, "A", "B").unwrap();
        assert!((r + 1.0).abs() < 1e-9);
    }

    #[test]
    fn correlation_uses_only_complete_rows() {
        let ds = dataset(
            &["A", "B"],
            vec![
                ints(&[1, 2]),
                vec![CellValue::Integer(100), CellValue::Null],
                ints(&[2, 4]),
                ints(&[3, 6]),
            ],
        );
        let r = correlation(&ds, "A", "B").unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_correlation_is_undefined() {
        let one_row = dataset(&["A", "B"], vec![ints(&[1, 2])]);
        assert!(matches!(
            correlation(&one_row, "A", "B"),
            Err(DashError::UndefinedStatistic { .. })
        ));
        let constant = dataset(&["A", "B"], vec![ints(&[1, 5]), ints(&[2, 5])]);
        assert!(matches!(
            correlation(&constant, "A", "B"),
            Err(DashError::UndefinedStatistic { .. })
        ));
    }

    #[test]
    fn constant_fractional_column_has_no_correlation() {
        let rows = [1.0, 2.0, 4.0]
            .iter()
            .map(|&b| vec![CellValue::Float(0.1), CellValue::Float(b)])
            .collect();
        let tenths = dataset(&["A", "B"], rows);
        assert!(matches!(
            correlation(&tenths, "A", "B"),
            Err(DashError::UndefinedStatistic { .. })
        ));

        let rows = (1..=7)
            .map(|b| vec![CellValue::Float(0.7), CellValue::Integer(b * b)])
            .collect();
        let sevenths = dataset(&["A", "B"], rows);
        assert!(matches!(
            correlation(&sevenths, "B", "A"),
            Err(DashError::UndefinedStatistic { .. })
        ));
    }

    #[test]
    fn numeric_ticks_hide_float_noise() {
        let chart = LineChart {
            title: String::new(),
            x_column: "T".to_string(),
            x_kind: ColumnKind::Numeric,
            x_labels: Vec::new(),
            series: Vec::new(),
        };
        assert_eq!(chart.x_label(0.1 + 0.2), "0.3");
        assert_eq!(chart.x_label(2.0), "2");
        assert_eq!(chart.x_label(-1.25), "-1.25");
        assert_eq!(chart.x_label(-0.0000001), "0");
    }

    #[test]
    fn frequency_counts_sort_by_count_then_first_occurrence() {
        let cells = ["x", "y", "x", "z", "y", "x"]
            .iter()
            .map(|s| CellValue::Text(s.to_string()))
            .collect();
        let counts = frequency_counts(&column("P", cells), "P").unwrap();
        assert_eq!(
            counts,
            vec![("x".to_string(), 3), ("y".to_string(), 2), ("z".to_string(), 1)]
        );
    }

    #[test]
    fn frequency_counts_break_ties_by_first_occurrence() {
        let cells = vec![
            CellValue::Text("b".into()),
            CellValue::Null,
            CellValue::Text("a".into()),
        ];
        let counts = frequency_counts(&column("P", cells), "P").unwrap();
        assert_eq!(counts, vec![("b".to_string(), 1), ("a".to_string(), 1)]);
    }

    #[test]
    fn pie_shares_add_up() {
        let pie = pie_chart(&column("P", ints(&[1, 1, 2, 3])), "P").unwrap();
        assert_eq!(pie.title, "Pie Chart of P");
        assert_eq!(pie.slices[0].label, "1");
        assert_eq!(pie.slices[0].share, 0.5);
        let total: f64 = pie.slices.iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn line_chart_dedupes_series_and_maps_categories() {
        let ds = dataset(
            &["M", "V"],
            vec![
                vec![CellValue::Text("Jan".into()), CellValue::Integer(5)],
                vec![CellValue::Text("Feb".into()), CellValue::Null],
                vec![CellValue::Text("Mar".into()), CellValue::Integer(7)],
            ],
        );
        let chart = line_chart(
            &ds,
            "M",
            ColumnKind::Categorical,
            &["V".to_string(), "V".to_string()],
        )
        .unwrap();
        assert_eq!(chart.title, "Line Chart of V");
        assert_eq!(chart.x_labels, vec!["Jan", "Feb", "Mar"]);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].points, vec![[0.0, 5.0], [2.0, 7.0]]);
    }

    #[test]
    fn x_labels_follow_the_timeline_kind() {
        let mut chart = LineChart {
            title: String::new(),
            x_column: "M".into(),
            x_kind: ColumnKind::Categorical,
            x_labels: vec!["Jan".into(), "Feb".into()],
            series: Vec::new(),
        };
        assert_eq!(chart.x_label(1.0), "Feb");
        assert_eq!(chart.x_label(0.5), "");
        assert_eq!(chart.x_label(7.0), "");

        chart.x_kind = ColumnKind::Temporal;
        assert_eq!(chart.x_label(19723.0), "2024-01-01");
    }

    #[test]
    fn temporal_x_is_days_since_epoch() {
        let t = chrono::NaiveDate::from_ymd_opt(1970, 1, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(timestamp_to_x(t), 2.5);
    }

    #[test]
    fn build_views_on_an_empty_table_yields_zeroes_and_na() {
        let ds = dataset(&["T", "V"], vec![]);
        let selection = ViewSelection {
            numeric: NumericSelection::defaults(&["V".to_string()]).ok(),
            pie: Some("V".to_string()),
        };
        let views = build_views(&ds, "T", ColumnKind::Numeric, &selection).unwrap();
        assert!(views.kpis.iter().all(|k| k.value == 0.0));
        assert_eq!(views.correlation.unwrap().display_value(), "N/A");
        assert!(views.scatter.unwrap().points.is_empty());
        assert!(views.pie.unwrap().slices.is_empty());
    }

    #[test]
    fn build_views_without_numeric_columns_keeps_the_pie() {
        let ds = column("NAME", vec![CellValue::Text("a".into())]);
        let selection = ViewSelection::for_options(&[], &["NAME".to_string()]);
        let views = build_views(&ds, "NAME", ColumnKind::Categorical, &selection).unwrap();
        assert!(views.kpis.is_empty());
        assert!(views.correlation.is_none());
        assert!(views.line.is_none());
        assert_eq!(views.pie.unwrap().slices.len(), 1);
    }
}
