//! Wind vector decoding and extraction for gridded reanalysis data.
//!
//! Turns the eastward/northward (U, V) components of a [`WindField`] into
//! direction and speed, either for one point across the full time axis or
//! for every grid cell at one time step.
//!
//! # Architecture
//!
//! ```text
//! WindField (time × lat × lon, U and V)
//!      │
//!      ├─► extract_point_series(lat, lon)     ──► PointSeries ──► WindroseTable
//!      │        │                                  (blows-from)
//!      │        └─► LookupPolicy resolves lat/lon indices
//!      │
//!      └─► extract_grid_snapshot(timestamp)    ──► GridSnapshot ──► delimited text
//!               │                                  (raw heading)
//!               └─► TimeReference resolves the time index
//!
//! every selected cell ──► decode(U, V) ──► PolarReading
//! ```
//!
//! # Example
//!
//! ```ignore
//! use wind_common::ExactMatch;
//! use wind_processor::{extract_point_series, WindroseConfig, WindroseTable};
//!
//! let series = extract_point_series(&field, 38.75, -9.5, &ExactMatch)?;
//! let rose = WindroseTable::from_series(&series, &WindroseConfig::default())?;
//! ```
//!
//! [`WindField`]: wind_common::WindField

pub mod decoder;
pub mod export;
pub mod extract;
pub mod windrose;

pub use decoder::{decode, decode_sample, to_blows_from, PolarReading, MS_TO_KNOTS};
pub use export::{export_grid_snapshot, format_row, write_grid_snapshot, GRID_HEADER};
pub use extract::{
    extract_grid_snapshot, extract_grid_snapshot_at, extract_point_series, GridRow, GridSnapshot,
    PointSeries,
};
pub use windrose::{WindroseConfig, WindroseTable};
