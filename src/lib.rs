//! Interactive dashboard over an uploaded table: pick a timeline column,
//! narrow it to a range, and read KPI sums, a correlation and three charts
//! off the rows that remain.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
