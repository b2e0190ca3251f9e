/// Data layer: spectral records, FITS loading, transformations.
///
/// Architecture:
/// ```text
///  .fits / .fits.gz               lines.csv
///        │                            │
///        ▼                            ▼
///   ┌──────────┐                ┌──────────┐
///   │  loader   │ header + row  │  lines    │ catalog lookup
///   └──────────┘                └──────────┘
///        │                            │
///        ▼                            ▼
///   ┌────────────────┐  duplicate → core → show  ┌──────────────┐
///   │ SpectralRecord  │ ────────────────────────▶│ PlotSurface   │
///   └────────────────┘       (transform)          └──────────────┘
/// ```
pub mod derived;
pub mod error;
pub mod lines;
pub mod loader;
pub mod model;
pub mod range;
pub mod smooth;
pub mod transform;
