use eframe::egui::{self, RichText, Ui};

use crate::data::views::{CorrelationCard, KpiCard};

/// Round to a whole number and group thousands: `1234567.8` → `1,234,568`.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

fn card(ui: &mut Ui, title: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new(title).small().strong());
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

/// Render up to four KPI cards followed by the correlation card.
pub fn kpi_row(ui: &mut Ui, kpis: &[KpiCard], correlation: Option<&CorrelationCard>) {
    let n = kpis.len() + usize::from(correlation.is_some());
    if n == 0 {
        return;
    }
    ui.columns(n, |cols| {
        for (col, kpi) in cols.iter_mut().zip(kpis) {
            card(col, &kpi.label, &format_thousands(kpi.value));
        }
        if let (Some(corr), Some(col)) = (correlation, cols.last_mut()) {
            card(col, &corr.label(), &corr.display_value());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1234567.8), "1,234,568");
        assert_eq!(format_thousands(-45210.0), "-45,210");
    }
}
