use super::error::DashError;

/// Column choices for the widgets that need numeric columns.
///
/// Slots may repeat a column; every slot always names one of the
/// current numeric options.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSelection {
    pub kpis: [String; 4],
    pub correlation: (String, String),
    pub line: [String; 3],
    pub scatter: (String, String),
}

impl NumericSelection {
    /// Slot `i` takes the `i`-th option, or the first when there are fewer.
    pub fn defaults(options: &[String]) -> Result<Self, DashError> {
        let first = options.first().ok_or(DashError::EmptySelection)?;
        let nth = |i: usize| options.get(i).unwrap_or(first).clone();
        Ok(NumericSelection {
            kpis: [nth(0), nth(1), nth(2), nth(3)],
            correlation: (nth(0), nth(1)),
            line: [nth(0), nth(1), nth(2)],
            scatter: (nth(0), nth(0)),
        })
    }

    /// Replace every slot whose column is no longer offered by that slot's
    /// default.
    pub fn reconcile(&mut self, options: &[String]) -> Result<(), DashError> {
        let defaults = NumericSelection::defaults(options)?;
        let keep = |slot: &mut String, default: &String| {
            if !options.contains(slot) {
                log::warn!("Column {slot} is no longer available, using {default}");
                *slot = default.clone();
            }
        };
        for (slot, default) in self.kpis.iter_mut().zip(&defaults.kpis) {
            keep(slot, default);
        }
        keep(&mut self.correlation.0, &defaults.correlation.0);
        keep(&mut self.correlation.1, &defaults.correlation.1);
        for (slot, default) in self.line.iter_mut().zip(&defaults.line) {
            keep(slot, default);
        }
        keep(&mut self.scatter.0, &defaults.scatter.0);
        keep(&mut self.scatter.1, &defaults.scatter.1);
        Ok(())
    }
}

/// Every widget selection of the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewSelection {
    /// `None` when the table has no numeric column.
    pub numeric: Option<NumericSelection>,
    pub pie: Option<String>,
}

impl ViewSelection {
    /// Defaults for the given option lists.
    pub fn for_options(numeric: &[String], pie: &[String]) -> Self {
        ViewSelection {
            numeric: NumericSelection::defaults(numeric).ok(),
            pie: pie.first().cloned(),
        }
    }

    /// Keep what is still valid and fall back to defaults for the rest.
    pub fn reconcile(&mut self, numeric: &[String], pie: &[String]) {
        self.numeric = match self.numeric.take() {
            Some(mut current) => current.reconcile(numeric).ok().map(|()| current),
            None => NumericSelection::defaults(numeric).ok(),
        };
        if !self.pie.as_ref().is_some_and(|p| pie.contains(p)) {
            self.pie = pie.first().cloned();
        }
    }
}
