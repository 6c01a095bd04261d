//! Error types for NetCDF parsing operations.

use thiserror::Error;
use wind_common::WindError;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reported by libnetcdf
    #[error("NetCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Axes or samples rejected while building the wind field
    #[error(transparent)]
    Wind(#[from] WindError),
}
