//! Gridded wind fields on a regular time × latitude × longitude cube.

use serde::{Deserialize, Serialize};

use crate::error::{Axis, WindError, WindResult};
use crate::lookup::LookupPolicy;

/// Reserved component value meaning "no data" for a cell.
pub const MISSING_SENTINEL: f64 = -32767.0;

/// One (U, V) wind sample in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Eastward component
    pub u: f64,
    /// Northward component
    pub v: f64,
}

impl Sample {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// A sample is missing when either component carries the sentinel or is
    /// not a finite number.
    pub fn is_missing(&self) -> bool {
        self.u == MISSING_SENTINEL
            || self.v == MISSING_SENTINEL
            || !self.u.is_finite()
            || !self.v.is_finite()
    }
}

/// The three positional coordinate axes of a wind field.
///
/// Time values are integer hours since the dataset epoch and strictly
/// ascending. Latitude and longitude are strictly monotonic in either
/// direction, so every coordinate value maps to exactly one index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    time: Vec<i64>,
    latitude: Vec<f64>,
    longitude: Vec<f64>,
}

impl GridAxes {
    pub fn new(time: Vec<i64>, latitude: Vec<f64>, longitude: Vec<f64>) -> WindResult<Self> {
        if time.windows(2).any(|w| w[1] <= w[0]) {
            return Err(WindError::invalid_axis(
                Axis::Time,
                "values must be strictly ascending",
            ));
        }
        check_monotonic(Axis::Latitude, &latitude)?;
        check_monotonic(Axis::Longitude, &longitude)?;

        Ok(Self {
            time,
            latitude,
            longitude,
        })
    }

    pub fn time(&self) -> &[i64] {
        &self.time
    }

    pub fn latitude(&self) -> &[f64] {
        &self.latitude
    }

    pub fn longitude(&self) -> &[f64] {
        &self.longitude
    }

    /// (time, latitude, longitude) lengths.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.time.len(), self.latitude.len(), self.longitude.len())
    }

    /// Number of cells in the full cube.
    pub fn len(&self) -> usize {
        self.time.len() * self.latitude.len() * self.longitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of an hours-since-epoch value on the time axis.
    ///
    /// Time values are integers, so this is always an exact match.
    pub fn time_index(&self, hours: i64) -> WindResult<usize> {
        self.time
            .iter()
            .position(|&t| t == hours)
            .ok_or_else(|| WindError::axis_lookup(Axis::Time, hours))
    }

    pub fn latitude_index(&self, latitude: f64, policy: &dyn LookupPolicy) -> WindResult<usize> {
        policy
            .locate(&self.latitude, latitude)
            .ok_or_else(|| WindError::axis_lookup(Axis::Latitude, latitude))
    }

    pub fn longitude_index(&self, longitude: f64, policy: &dyn LookupPolicy) -> WindResult<usize> {
        policy
            .locate(&self.longitude, longitude)
            .ok_or_else(|| WindError::axis_lookup(Axis::Longitude, longitude))
    }

    /// Flat row-major offset of `(t, lat, lon)`.
    pub fn flat_index(&self, t: usize, lat: usize, lon: usize) -> usize {
        (t * self.latitude.len() + lat) * self.longitude.len() + lon
    }
}

fn check_monotonic(axis: Axis, values: &[f64]) -> WindResult<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(WindError::invalid_axis(axis, "values must be finite"));
    }
    let ascending = values.windows(2).all(|w| w[1] > w[0]);
    let descending = values.windows(2).all(|w| w[1] < w[0]);
    if !(ascending || descending) {
        return Err(WindError::invalid_axis(
            axis,
            "values must be strictly ascending or strictly descending",
        ));
    }
    Ok(())
}

/// A fully loaded U/V wind cube.
///
/// Component arrays are flat, row-major `[time][latitude][longitude]`, in m/s,
/// with [`MISSING_SENTINEL`] marking cells without data.
#[derive(Debug, Clone)]
pub struct WindField {
    axes: GridAxes,
    u: Vec<f64>,
    v: Vec<f64>,
}

impl WindField {
    pub fn new(axes: GridAxes, u: Vec<f64>, v: Vec<f64>) -> WindResult<Self> {
        let expected = axes.len();
        if u.len() != expected || v.len() != expected {
            let (nt, nlat, nlon) = axes.shape();
            return Err(WindError::ShapeMismatch(format!(
                "axes {}x{}x{} need {} values, got u={} v={}",
                nt,
                nlat,
                nlon,
                expected,
                u.len(),
                v.len()
            )));
        }
        Ok(Self { axes, u, v })
    }

    pub fn axes(&self) -> &GridAxes {
        &self.axes
    }

    /// The sample at `(t, lat, lon)`, or `None` if any index is out of range.
    pub fn sample(&self, t: usize, lat: usize, lon: usize) -> Option<Sample> {
        let (nt, nlat, nlon) = self.axes.shape();
        if t >= nt || lat >= nlat || lon >= nlon {
            return None;
        }
        let idx = self.axes.flat_index(t, lat, lon);
        Some(Sample::new(self.u[idx], self.v[idx]))
    }

    /// Number of cells whose sample is missing.
    pub fn missing_count(&self) -> usize {
        self.u
            .iter()
            .zip(&self.v)
            .filter(|(&u, &v)| Sample::new(u, v).is_missing())
            .count()
    }
}
