/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  URI / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<LaunchRecord>, distinct sites
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  (site, payload range) → aggregate / subset
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
