use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui::Color32;
use serde::Deserialize;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "RUSTY_DASH_CONFIG";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "rusty-dash.json";

/// User-tunable dashboard settings.
///
/// Every field is optional in the JSON file; missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub window_title: String,
    pub heading: String,
    /// Cell text replaced by `0` when a file is loaded.
    pub placeholder: String,
    pub chart_height: f32,
    /// Rows shown in the data table below the charts.
    pub table_row_limit: usize,
    /// Hex colours (`#RRGGBB`) for the line series, in indicator order.
    pub line_colors: Vec<String>,
    pub scatter_color: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window_title: "Rusty Dash – Data Dashboard".to_string(),
            heading: "Dashboard Interactive".to_string(),
            placeholder: "-".to_string(),
            chart_height: 340.0,
            table_row_limit: 500,
            line_colors: vec![
                "#066D6D".to_string(),
                "#B37100".to_string(),
                "#00D6D6".to_string(),
            ],
            scatter_color: "#711BFF".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load from `$RUSTY_DASH_CONFIG` or `./rusty-dash.json`, falling back to
    /// defaults when neither is usable.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            });

        match path {
            Some(path) => match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring config: {e:#}");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    /// Colour of the `index`-th line series, cycling through the configured list.
    pub fn line_color(&self, index: usize) -> Color32 {
        if self.line_colors.is_empty() {
            return Color32::LIGHT_BLUE;
        }
        parse_hex_color(&self.line_colors[index % self.line_colors.len()])
            .unwrap_or(Color32::LIGHT_BLUE)
    }

    pub fn scatter_color(&self) -> Color32 {
        parse_hex_color(&self.scatter_color).unwrap_or(Color32::LIGHT_BLUE)
    }
}

/// Parse `#RRGGBB` (the leading `#` is optional).
pub fn parse_hex_color(s: &str) -> Option<Color32> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}
