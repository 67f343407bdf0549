/// Data layer: result tables, loading, and population lookups.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json / .npz
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  Source strategy → ResultTable / structured doc / arrays
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ ResultTable  │  named columns of Cells, row filters, group means
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ regions   │  matrix header → panel → region
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod regions;
