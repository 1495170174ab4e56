use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{CellValue, Dataset};

fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render the first `limit` rows of `dataset`.
pub fn data_table(ui: &mut Ui, dataset: &Dataset, limit: usize) {
    let shown = dataset.len().min(limit);
    ui.label(format!("Showing {shown} of {} rows", dataset.len()));
    if dataset.columns.is_empty() {
        return;
    }

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0), dataset.columns.len())
            .header(20.0, |mut header| {
                for name in &dataset.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, shown, |mut row| {
                    let cells = &dataset.rows[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell_text(cell));
                        });
                    }
                });
            });
    });
}
