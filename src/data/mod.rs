/// Data layer: core types, loading, filtering, statistics, and export.
///
/// Architecture:
/// ```text
///   capture.csv (path or byte stream)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  validate 18-column schema, coerce core fields
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ WsnDataset  │  Vec<Record>, node/class indices (immutable)
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply predicate → fresh derived dataset
///   └──────────┘
///        │
///        ├──► stats   (summaries, rankings, energy series)
///        └──► export  (CSV with the original column layout)
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
