//! Error types for wind extraction.

use std::fmt;

use thiserror::Error;

/// Result type alias using WindError.
pub type WindResult<T> = Result<T, WindError>;

/// The three positional axes of a wind field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Time,
    Latitude,
    Longitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Time => "time",
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
        };
        f.write_str(name)
    }
}

/// Primary error type for wind extraction.
#[derive(Debug, Error)]
pub enum WindError {
    /// The requested coordinate or time has no match on its axis.
    #[error("no {axis} value matching {value} on the {axis} axis")]
    AxisLookup { axis: Axis, value: String },

    #[error("malformed timestamp '{input}': {reason}")]
    MalformedTimestamp { input: String, reason: String },

    #[error("invalid time units '{0}'")]
    InvalidTimeUnits(String),

    #[error("invalid {axis} axis: {message}")]
    InvalidAxis { axis: Axis, message: String },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WindError {
    /// Create an AxisLookup error for any displayable target value.
    pub fn axis_lookup(axis: Axis, value: impl fmt::Display) -> Self {
        Self::AxisLookup {
            axis,
            value: value.to_string(),
        }
    }

    /// Create an InvalidAxis error.
    pub fn invalid_axis(axis: Axis, message: impl Into<String>) -> Self {
        Self::InvalidAxis {
            axis,
            message: message.into(),
        }
    }

    /// Whether this error is a failed axis lookup (as opposed to bad input data).
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, WindError::AxisLookup { .. })
    }
}
