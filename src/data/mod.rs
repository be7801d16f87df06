/// Data layer: core types, loading, filtering, and indicators.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (or None when the file is absent)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, column presence, unique-value catalog
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterState predicates → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ indicators  │  aggregate the subset → IndicatorSet
///   └────────────┘
/// ```

pub mod filter;
pub mod indicators;
pub mod loader;
pub mod model;
