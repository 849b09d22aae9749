/// Data layer: core types, loading, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → MeasurementTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ MeasurementTable  │  Vec<Measurement>, resolved columns
///   └──────────────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group by x → estimate + band per x
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod loader;
pub mod model;
