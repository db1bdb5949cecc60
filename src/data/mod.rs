/// Data layer: core types, loading, filtering, and the chart aggregations.
///
/// Architecture:
/// ```text
///  .parquet / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ShipmentDataset (memoized, load-once)
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ ShipmentDataset │  Vec<Shipment>, distinct-value indices
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  mode/status selections → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────────┐
///   │ metrics │ aggregate │  KPIs + the eight chart views
///   └─────────────────────┘
/// ```
pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
