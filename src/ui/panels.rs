use std::hash::Hash;

use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::range::{ColumnDomain, RangeSelection};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – timeline, range and view selectors
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Variables");
    ui.separator();

    let columns = match &state.dataset {
        Some(ds) => ds.columns.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            timeline_picker(ui, state, &columns);
            range_widgets(ui, state);
            ui.separator();
            view_selectors(ui, state);
        });
}

fn timeline_picker(ui: &mut Ui, state: &mut AppState, columns: &[String]) {
    ui.strong("Timeline column (X axis)");
    let current = state.timeline.clone();
    let mut chosen = current.clone();
    egui::ComboBox::from_id_salt("timeline")
        .selected_text(current.as_deref().unwrap_or("—"))
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut chosen, None, "—");
            for col in columns {
                ui.selectable_value(&mut chosen, Some(col.clone()), col);
            }
        });
    if chosen != current {
        state.set_timeline(chosen);
    }
}

fn range_widgets(ui: &mut Ui, state: &mut AppState) {
    let (Some(domain), Some(kind)) = (state.domain.clone(), state.timeline_kind) else {
        return;
    };
    ui.label(RichText::new(format!("Range ({kind})")).small());

    let updated = match (&domain, state.range.clone()) {
        (ColumnDomain::Numeric { min, max }, Some(RangeSelection::Numeric { mut start, mut end })) => {
            let mut changed = false;
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Start");
                changed |= ui.add(DragValue::new(&mut start).range(*min..=*max)).changed();
                ui.label("End");
                changed |= ui.add(DragValue::new(&mut end).range(*min..=*max)).changed();
            });
            changed.then_some(RangeSelection::Numeric { start, end })
        }
        (ColumnDomain::Temporal { .. }, Some(RangeSelection::Temporal { mut start, mut end })) => {
            let mut changed = false;
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Start");
                changed |= ui
                    .add(DatePickerButton::new(&mut start).id_salt("range_start"))
                    .changed();
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("End");
                changed |= ui
                    .add(DatePickerButton::new(&mut end).id_salt("range_end"))
                    .changed();
            });
            changed.then_some(RangeSelection::Temporal { start, end })
        }
        (
            ColumnDomain::Categorical { values },
            Some(RangeSelection::Categorical { mut start, mut end }),
        ) => {
            let before = (start.clone(), end.clone());
            value_combo(ui, "Start", "range_start", &mut start, values);
            value_combo(ui, "End", "range_end", &mut end, values);
            ((start.clone(), end.clone()) != before)
                .then_some(RangeSelection::Categorical { start, end })
        }
        (ColumnDomain::Empty, _) => {
            ui.label(RichText::new("The timeline column has no values.").italics());
            None
        }
        _ => None,
    };

    if let Some(range) = updated {
        state.set_range(range);
    }
}

fn view_selectors(ui: &mut Ui, state: &mut AppState) {
    let mut selection = state.selection.clone();

    match selection.numeric.as_mut() {
        Some(numeric) => {
            let options = &state.numeric_options;

            ui.strong("KPI");
            for (i, slot) in numeric.kpis.iter_mut().enumerate() {
                value_combo(ui, &format!("KPI {}", i + 1), ("kpi", i), slot, options);
            }

            ui.strong("Correlation");
            value_combo(ui, "Variable 1", "corr_1", &mut numeric.correlation.0, options);
            value_combo(ui, "Variable 2", "corr_2", &mut numeric.correlation.1, options);

            ui.strong("Line chart");
            for (i, slot) in numeric.line.iter_mut().enumerate() {
                value_combo(ui, &format!("Indicator {}", i + 1), ("line", i), slot, options);
            }

            ui.strong("Scatter");
            value_combo(ui, "X", "scatter_x", &mut numeric.scatter.0, options);
            value_combo(ui, "Y", "scatter_y", &mut numeric.scatter.1, options);
        }
        None => {
            ui.label(
                RichText::new("No numeric columns: KPI, correlation, line and scatter are hidden.")
                    .italics(),
            );
        }
    }

    ui.strong("Pie chart");
    if let Some(pie) = selection.pie.as_mut() {
        value_combo(ui, "Category", "pie", pie, &state.pie_options);
    }

    if selection != state.selection {
        state.set_selection(selection);
    }
}

/// A labelled combo box choosing one of `options` into `slot`.
fn value_combo(ui: &mut Ui, label: &str, id: impl Hash, slot: &mut String, options: &[String]) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(slot.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for opt in options {
                    ui.selectable_value(slot, opt.clone(), opt);
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.loading {
            ui.spinner();
        }

        if let Some(ds) = &state.dataset {
            let in_range = state
                .filtered
                .as_ref()
                .map(|f| f.len().to_string())
                .unwrap_or_else(|| "–".to_string());
            ui.label(format!("{} rows loaded, {in_range} in range", ds.len()));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::DARK_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload data (CSV / Excel)")
        .add_filter("Supported files", &["csv", "xlsx", "xls", "xlsm", "xlsb", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xls", "xlsm", "xlsb"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.upload(&path);
    }
}
