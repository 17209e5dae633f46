/// Data layer: core types, table I/O, and the despiking engine.
///
/// Architecture:
/// ```text
///  .csv / .asc
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse table → SampleSeries
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ despike   │  windowed MAD → mask → interpolate
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  SampleSeries → <base>-sparkremoved.csv
///   └──────────┘
/// ```

pub mod despike;
pub mod loader;
pub mod model;
pub mod writer;
