/// Reporting layer: statistics computed from the cohort for each view.
///
/// ```text
///   cohort + base table
///        │
///        ▼
///   ┌──────────┐
///   │  views    │  Kpis, Benchmarks, Efficiency, Accessibility, Quality
///   └──────────┘
///        │ uses
///        ▼
///   ┌──────────┐
///   │  stats    │  mean, median, quantiles, correlation, fits, bins
///   └──────────┘
/// ```

pub mod stats;
pub mod views;
