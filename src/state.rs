use std::path::Path;

use crate::config::DashboardConfig;
use crate::data::classify::{classify, columns_of_kind, ColumnKind};
use crate::data::error::DashError;
use crate::data::loader::load_file;
use crate::data::model::Dataset;
use crate::data::range::{apply, column_domain, resolve, ColumnDomain, RangePredicate, RangeSelection};
use crate::data::selection::ViewSelection;
use crate::data::views::{build_views, DerivedViews};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The session context: the current dataset and everything derived from it.
///
/// Each user action goes through one method here and ends in
/// [`AppState::recompute`], which classifies, filters and derives afresh.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// Column chosen as the filtering axis.
    pub timeline: Option<String>,
    pub timeline_kind: Option<ColumnKind>,
    pub domain: Option<ColumnDomain>,

    /// Current bounds; `None` when the timeline column is empty.
    pub range: Option<RangeSelection>,

    /// Columns offered to the numeric widgets and to the pie widget.
    pub numeric_options: Vec<String>,
    pub pie_options: Vec<String>,
    pub selection: ViewSelection,

    /// Rows passing the current range (cached).
    pub filtered: Option<Dataset>,
    pub views: Option<DerivedViews>,

    /// Error from the last recomputation; results are cleared while set.
    pub error: Option<DashError>,

    /// Status / error message from the last upload.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            timeline: None,
            timeline_kind: None,
            domain: None,
            range: None,
            numeric_options: Vec::new(),
            pie_options: Vec::new(),
            selection: ViewSelection::default(),
            filtered: None,
            views: None,
            error: None,
            status_message: None,
            loading: false,
        }
    }

    /// Load a file and make it the current dataset. On failure the previous
    /// dataset stays in place and the error is kept in `status_message`.
    pub fn upload(&mut self, path: &Path) {
        self.loading = true;
        match load_file(path, &self.config.placeholder) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with columns {:?} from {}",
                    dataset.len(),
                    dataset.columns,
                    path.display()
                );
                self.set_dataset(dataset);
                self.status_message = Some(format!("Loaded {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.loading = false;
    }

    /// Ingest a newly loaded dataset, replacing the previous one wholesale.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.numeric_options = columns_of_kind(&dataset, &[ColumnKind::Numeric]);
        self.pie_options =
            columns_of_kind(&dataset, &[ColumnKind::Numeric, ColumnKind::Categorical]);
        self.selection
            .reconcile(&self.numeric_options, &self.pie_options);

        let timeline = self.timeline.take().filter(|col| {
            let present = dataset.column_index(col).is_some();
            if !present {
                log::warn!("Timeline column {col} is not in the new dataset");
            }
            present
        });

        self.dataset = Some(dataset);
        self.status_message = None;
        self.set_timeline(timeline);
    }

    /// Choose the timeline column and reset the range to its whole domain.
    pub fn set_timeline(&mut self, column: Option<String>) {
        self.timeline = None;
        self.timeline_kind = None;
        self.domain = None;
        self.range = None;

        if let (Some(col), Some(ds)) = (column, &self.dataset) {
            match classify(ds, &col).and_then(|kind| Ok((kind, column_domain(ds, &col, kind)?))) {
                Ok((kind, domain)) => {
                    log::debug!("Timeline {col} is {kind}, domain {domain:?}");
                    self.range = RangeSelection::full(&domain);
                    self.timeline_kind = Some(kind);
                    self.domain = Some(domain);
                    self.timeline = Some(col);
                }
                Err(e) => log::warn!("Cannot use {col} as timeline: {e}"),
            }
        }
        self.recompute();
    }

    /// Update the range bounds; numeric and temporal bounds are clamped
    /// into the column's domain.
    pub fn set_range(&mut self, selection: RangeSelection) {
        self.range = Some(match &self.domain {
            Some(domain) => selection.clamp(domain),
            None => selection,
        });
        self.recompute();
    }

    pub fn set_selection(&mut self, mut selection: ViewSelection) {
        selection.reconcile(&self.numeric_options, &self.pie_options);
        self.selection = selection;
        self.recompute();
    }

    /// Recompute the filtered dataset and derived views from scratch.
    pub fn recompute(&mut self) {
        self.error = None;
        self.filtered = None;
        self.views = None;

        let (Some(ds), Some(timeline), Some(kind)) =
            (&self.dataset, &self.timeline, self.timeline_kind)
        else {
            return;
        };

        match compute(ds, timeline, kind, self.range.as_ref(), &self.selection) {
            Ok((filtered, views)) => {
                log::debug!("{} of {} rows in range", filtered.len(), ds.len());
                self.filtered = Some(filtered);
                self.views = Some(views);
            }
            Err(e) => {
                log::warn!("Recompute failed: {e}");
                self.error = Some(e);
            }
        }
    }
}

/// classify → resolve → filter → derive for one interaction.
fn compute(
    dataset: &Dataset,
    timeline: &str,
    kind: ColumnKind,
    range: Option<&RangeSelection>,
    selection: &ViewSelection,
) -> Result<(Dataset, DerivedViews), DashError> {
    let predicate = match range {
        Some(range) => resolve(dataset, timeline, kind, range)?,
        None => RangePredicate::Nothing,
    };
    let filtered = apply(dataset, timeline, &predicate)?;
    let views = build_views(&filtered, timeline, kind, selection)?;
    Ok((filtered, views))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn sample() -> Dataset {
        Dataset::from_rows(
            vec!["t".into(), "v".into(), "region".into()],
            vec![
                vec![CellValue::Integer(1), CellValue::Integer(10), CellValue::Text("N".into())],
                vec![CellValue::Integer(2), CellValue::Integer(20), CellValue::Text("S".into())],
                vec![CellValue::Integer(3), CellValue::Integer(30), CellValue::Text("N".into())],
            ],
            "-",
        )
        .unwrap()
    }

    #[test]
    fn nothing_is_derived_until_a_timeline_is_chosen() {
        let mut state = AppState::default();
        state.set_dataset(sample());
        assert!(state.filtered.is_none());
        assert!(state.views.is_none());
        assert_eq!(state.numeric_options, vec!["T", "V"]);
        assert_eq!(state.pie_options, vec!["T", "V", "REGION"]);
    }

    #[test]
    fn choosing_a_timeline_selects_the_whole_domain() {
        let mut state = AppState::default();
        state.set_dataset(sample());
        state.set_timeline(Some("T".into()));
        assert_eq!(state.range, Some(RangeSelection::Numeric { start: 1.0, end: 3.0 }));
        assert_eq!(state.filtered.as_ref().map(Dataset::len), Some(3));
    }

    #[test]
    fn invalid_range_clears_results() {
        let mut state = AppState::default();
        state.set_dataset(sample());
        state.set_timeline(Some("T".into()));
        state.set_range(RangeSelection::Numeric { start: 3.0, end: 1.0 });
        assert!(matches!(state.error, Some(DashError::InvalidRange(_))));
        assert!(state.filtered.is_none());
        assert!(state.views.is_none());

        state.set_range(RangeSelection::Numeric { start: 1.0, end: 2.0 });
        assert!(state.error.is_none());
        assert_eq!(state.filtered.as_ref().map(Dataset::len), Some(2));
    }

    #[test]
    fn reupload_without_the_timeline_column_falls_back() {
        let mut state = AppState::default();
        state.set_dataset(sample());
        state.set_timeline(Some("REGION".into()));

        let other = Dataset::from_rows(
            vec!["x".into()],
            vec![vec![CellValue::Integer(5)]],
            "-",
        )
        .unwrap();
        state.set_dataset(other);
        assert_eq!(state.timeline, None);
        assert_eq!(state.selection.pie.as_deref(), Some("X"));
        assert_eq!(
            state.selection.numeric.as_ref().map(|n| n.kpis[0].clone()),
            Some("X".to_string())
        );
    }

    #[test]
    fn failed_upload_keeps_the_previous_dataset() {
        let mut state = AppState::default();
        state.set_dataset(sample());
        state.upload(Path::new("/definitely/not/here.csv"));
        assert!(state.dataset.is_some());
        assert!(state.status_message.as_deref().unwrap_or("").starts_with("Error"));
        assert!(!state.loading);
    }

    #[test]
    fn range_is_clamped_into_the_domain() {
        let mut state = AppState::default();
        state.set_dataset(sample());
        state.set_timeline(Some("T".into()));
        state.set_range(RangeSelection::Numeric { start: -10.0, end: 2.0 });
        assert_eq!(state.range, Some(RangeSelection::Numeric { start: 1.0, end: 2.0 }));
    }
}
