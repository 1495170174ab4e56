/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  timeline column → Numeric | Temporal | Categorical
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  range    │  bounds → predicate → filtered Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  views    │  KPI sums, correlation, chart series, pie counts
///   └──────────┘
/// ```

pub mod classify;
pub mod error;
pub mod loader;
pub mod model;
pub mod range;
pub mod selection;
pub mod views;
