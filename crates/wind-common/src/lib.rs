//! Common types shared across the ERA5 windrose crates and services.

pub mod error;
pub mod grid;
pub mod lookup;
pub mod time;

pub use error::{Axis, WindError, WindResult};
pub use grid::{GridAxes, Sample, WindField, MISSING_SENTINEL};
pub use lookup::{ExactMatch, LookupPolicy, WithinTolerance};
pub use time::{parse_timestamp, CfTimeUnits, TimeReference, TimeUnit, TIMESTAMP_FORMAT};
