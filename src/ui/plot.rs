use std::f64::consts::TAU;

use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::views::{LineChart, PieChart, ScatterPlot};
use crate::state::AppState;
use crate::ui::{cards, table};

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render cards, charts and the data table in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Upload a CSV or Excel file to start  (File → Open…)");
            });
            return;
        }
    };

    ui.heading(&state.config.heading);

    if state.timeline.is_none() {
        ui.label("Choose a timeline column in the side panel.");
        ui.separator();
        table::data_table(ui, dataset, state.config.table_row_limit);
        return;
    }

    if let Some(err) = &state.error {
        ui.label(RichText::new(err.to_string()).color(Color32::RED));
        ui.label("Results are hidden until the range is fixed.");
        return;
    }

    let (Some(views), Some(filtered)) = (&state.views, &state.filtered) else {
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            cards::kpi_row(ui, &views.kpis, views.correlation.as_ref());
            ui.add_space(8.0);

            ui.columns(3, |cols| {
                if let Some(chart) = &views.line {
                    line_plot(&mut cols[0], chart, &state.config);
                }
                if let Some(scatter) = &views.scatter {
                    scatter_plot(&mut cols[1], scatter, &state.config);
                }
                if let Some(pie) = &views.pie {
                    pie_plot(&mut cols[2], pie, &state.config);
                }
            });

            ui.separator();
            table::data_table(ui, filtered, state.config.table_row_limit);
        });
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

fn line_plot(ui: &mut Ui, chart: &LineChart, config: &DashboardConfig) {
    ui.strong(&chart.title);
    Plot::new("line_plot")
        .height(config.chart_height)
        .legend(Legend::default())
        .x_axis_label(chart.x_column.clone())
        .x_axis_formatter(|mark, _range| chart.x_label(mark.value))
        .show(ui, |plot_ui| {
            for (i, series) in chart.series.iter().enumerate() {
                let color = config.line_color(i);
                plot_ui.line(
                    Line::new(PlotPoints::from(series.points.clone()))
                        .name(&series.name)
                        .color(color)
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(series.points.clone()))
                        .name(&series.name)
                        .color(color)
                        .radius(2.5),
                );
            }
        });
}

fn scatter_plot(ui: &mut Ui, scatter: &ScatterPlot, config: &DashboardConfig) {
    ui.strong(&scatter.title);
    Plot::new("scatter_plot")
        .height(config.chart_height)
        .x_axis_label(scatter.x_column.clone())
        .y_axis_label(scatter.y_column.clone())
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(scatter.points.clone()))
                    .color(config.scatter_color())
                    .radius(3.0),
            );
        });
}

fn pie_plot(ui: &mut Ui, pie: &PieChart, config: &DashboardConfig) {
    ui.strong(&pie.title);
    let colors = ColorMap::new(pie.slices.iter().map(|s| s.label.as_str()));

    Plot::new("pie_plot")
        .height(config.chart_height)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for slice in &pie.slices {
                let end = start + slice.share;
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(slice_outline(start, end)))
                        .name(format!(
                            "{} ({}, {:.1}%)",
                            slice.label,
                            slice.count,
                            slice.share * 100.0
                        ))
                        .fill_color(colors.color_for(&slice.label))
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                );
                start = end;
            }
        });
}

/// Outline of a unit-circle wedge between two fractions of a full turn,
/// starting at 12 o'clock and running clockwise.
fn slice_outline(start: f64, end: f64) -> Vec<[f64; 2]> {
    let steps = ((end - start) * 128.0).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push([0.0, 0.0]);
    for i in 0..=steps {
        let frac = start + (end - start) * i as f64 / steps as f64;
        let angle = TAU * frac;
        points.push([angle.sin(), angle.cos()]);
    }
    points
}
