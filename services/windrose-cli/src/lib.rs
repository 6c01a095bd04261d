//! Windrose tables and grid snapshots from ERA5 wind files.
//!
//! The `windrose` binary is a thin argument layer over this library:
//! - `point`: decode the full time series at one or more grid points and
//!   bin each into a directional frequency table
//! - `grid`: decode every cell at one timestamp and export it as text

pub mod commands;
pub mod config;

pub use commands::{
    process_points, run_grid, run_point, snapshot_to_file, write_point_results, Coordinate,
    PointOptions, PointResult, WindroseReport,
};
pub use config::CliConfig;
