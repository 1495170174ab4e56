use std::io::Write;

use chrono::NaiveDate;
use rusty_dash::data::classify::ColumnKind;
use rusty_dash::data::error::DashError;
use rusty_dash::data::model::CellValue;
use rusty_dash::data::range::RangeSelection;
use rusty_dash::state::AppState;

fn csv_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn numeric_timeline_filters_and_sums() {
    let file = csv_file("T,V\n1,10\n2,20\n3,30\n");
    let mut state = AppState::default();
    state.upload(file.path());
    state.set_timeline(Some("T".into()));
    state.set_range(RangeSelection::Numeric { start: 1.0, end: 2.0 });

    let filtered = state.filtered.as_ref().unwrap();
    assert_eq!(
        filtered.rows,
        vec![
            vec![CellValue::Integer(1), CellValue::Integer(10)],
            vec![CellValue::Integer(2), CellValue::Integer(20)],
        ]
    );

    let views = state.views.as_ref().unwrap();
    let v = views.kpis.iter().find(|k| k.label == "V").unwrap();
    assert_eq!(v.value, 30.0);
}

#[test]
fn categorical_timeline_swaps_reversed_bounds() {
    let file = csv_file("month,sales\nA,1\nB,2\nC,3\nD,4\n");
    let mut state = AppState::default();
    state.upload(file.path());
    state.set_timeline(Some("MONTH".into()));
    assert_eq!(state.timeline_kind, Some(ColumnKind::Categorical));

    state.set_range(RangeSelection::Categorical { start: "C".into(), end: "B".into() });
    let reversed = state.filtered.clone().unwrap();
    state.set_range(RangeSelection::Categorical { start: "B".into(), end: "C".into() });
    let forward = state.filtered.clone().unwrap();

    assert_eq!(reversed, forward);
    let months: Vec<String> = forward.rows.iter().map(|r| r[0].to_string()).collect();
    assert_eq!(months, vec!["B", "C"]);
    assert!(state.error.is_none());
}

#[test]
fn temporal_timeline_filters_by_date() {
    let file = csv_file(
        "Date,Sales,Region\n2024-01-01,5,N\n2024-01-15,7,S\n2024-02-01,11,N\n2024-03-01,-,S\n",
    );
    let mut state = AppState::default();
    state.upload(file.path());
    state.set_timeline(Some("DATE".into()));
    assert_eq!(state.timeline_kind, Some(ColumnKind::Temporal));

    let day = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
    state.set_range(RangeSelection::Temporal { start: day(1, 10), end: day(3, 1) });

    let views = state.views.as_ref().unwrap();
    let sales = views.kpis.iter().find(|k| k.label == "SALES").unwrap();
    // The "-" placeholder counts as zero.
    assert_eq!(sales.value, 18.0);

    let pie = views.pie.as_ref().unwrap();
    assert_eq!(pie.column, "SALES");
    assert_eq!(state.filtered.as_ref().map(|f| f.len()), Some(3));
}

#[test]
fn reversed_numeric_range_blocks_the_views() {
    let file = csv_file("T,V\n1,10\n2,20\n");
    let mut state = AppState::default();
    state.upload(file.path());
    state.set_timeline(Some("T".into()));
    state.set_range(RangeSelection::Numeric { start: 2.0, end: 1.0 });

    assert!(matches!(state.error, Some(DashError::InvalidRange(_))));
    assert!(state.views.is_none());
}

#[test]
fn single_row_correlation_is_not_available() {
    let file = csv_file("T,A,B\n1,10,3\n2,20,5\n");
    let mut state = AppState::default();
    state.upload(file.path());
    state.set_timeline(Some("T".into()));
    state.set_range(RangeSelection::Numeric { start: 1.0, end: 1.0 });

    let corr = state.views.as_ref().unwrap().correlation.as_ref().unwrap();
    assert_eq!(corr.value, None);
    assert_eq!(corr.display_value(), "N/A");
}

#[test]
fn text_only_table_hides_numeric_views() {
    let file = csv_file("name,team\nana,red\nbo,blue\nana,blue\n");
    let mut state = AppState::default();
    state.upload(file.path());
    state.set_timeline(Some("NAME".into()));

    let views = state.views.as_ref().unwrap();
    assert!(views.kpis.is_empty());
    assert!(views.line.is_none());
    let pie = views.pie.as_ref().unwrap();
    assert_eq!(pie.slices[0].label, "ana");
    assert_eq!(pie.slices[0].count, 2);
}
