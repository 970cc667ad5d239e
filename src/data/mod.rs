/// Data layer: core types, loading, filtering and the derived reports.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, bounds, chest-pain types
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → FilteredView (indices)
///   └──────────┘
///        │
///        ├──► summary    → SummaryReport ──► narrative → Narrative
///        ├──► charts     → ChartData
///        └──► export     → CSV bytes
/// ```
pub mod charts;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod narrative;
pub mod summary;
