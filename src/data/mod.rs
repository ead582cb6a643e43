/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → rename first column → derive fields
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ DataSource  │  read once, share Arc<InstitutionTable>
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  sector + completion range → cohort table
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod source;
