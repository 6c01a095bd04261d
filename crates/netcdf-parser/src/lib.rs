//! NetCDF reader for ERA5 single-levels wind downloads.
//!
//! This crate reads the NetCDF-4 files produced by the Copernicus Climate
//! Data Store for `reanalysis-era5-single-levels` requests and turns them
//! into a [`wind_common::WindField`].
//!
//! # ERA5 Data Structure
//!
//! ```text
//! dimensions:
//!     longitude = 181 ; latitude = 141 ; time = 8784 ;
//! variables:
//!     float longitude(longitude) ;            degrees_east
//!     float latitude(latitude) ;              degrees_north, descending
//!     int time(time) ;                        hours since 1900-01-01 00:00:00.0
//!     short u10(time, latitude, longitude) ;  scale_factor, add_offset, _FillValue
//!     short v10(time, latitude, longitude) ;
//! ```
//!
//! Newer CDS output names the time axis `valid_time` (seconds since
//! 1970-01-01) and stores the components unpacked as `float`; both layouts
//! load through the same entry point.

mod era5;
mod error;
mod native;

pub use era5::{load_era5_dataset, load_wind_field, Era5Dataset, VariableNames};
pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;
