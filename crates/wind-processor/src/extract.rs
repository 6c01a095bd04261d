//! Point-series and grid-snapshot extraction from a loaded wind field.
//!
//! Both workflows are pure: they borrow the field read-only, resolve the
//! requested coordinate or time to axis indices, and decode every selected
//! cell. Independent calls can safely run in parallel on the same field.

use serde::{Deserialize, Serialize};
use tracing::debug;
use wind_common::{LookupPolicy, TimeReference, WindError, WindField, WindResult};

use crate::decoder::{decode_sample, to_blows_from, PolarReading};

/// Readings for one fixed (lat, lon) across the whole time axis.
///
/// Directions use the "blows from" convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSeries {
    pub latitude: f64,
    pub longitude: f64,
    /// Hours since the dataset epoch, one per reading
    pub times: Vec<i64>,
    pub readings: Vec<PolarReading>,
    /// Steps whose sample was missing; their reading is [`PolarReading::MISSING`]
    pub missing: Vec<bool>,
}

impl PointSeries {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn directions(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.direction).collect()
    }

    pub fn speeds_ms(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.speed_ms).collect()
    }

    /// (direction, speed m/s) pairs in time order.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.readings.iter().map(|r| (r.direction, r.speed_ms))
    }

    /// Like [`pairs`](Self::pairs) but without the missing steps.
    pub fn present_pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.readings
            .iter()
            .zip(&self.missing)
            .filter(|(_, &missing)| !missing)
            .map(|(r, _)| (r.direction, r.speed_ms))
    }

    pub fn missing_count(&self) -> usize {
        self.missing.iter().filter(|&&m| m).count()
    }
}

/// One decoded cell of a grid snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    pub latitude: f64,
    pub longitude: f64,
    pub reading: PolarReading,
}

/// Every cell of the spatial grid at one time step.
///
/// Rows are ordered by latitude index then longitude index, regardless of
/// whether the axis values ascend or descend. Directions are raw
/// "blows toward" headings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Hours since the dataset epoch
    pub time: i64,
    pub rows: Vec<GridRow>,
}

impl GridSnapshot {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Decode the full time series at one grid point.
///
/// The coordinate is resolved through `policy`; a coordinate that does not
/// resolve is an [`WindError::AxisLookup`] error, never an empty series.
/// Missing samples stay at [`PolarReading::MISSING`] and are not flipped.
pub fn extract_point_series(
    field: &WindField,
    latitude: f64,
    longitude: f64,
    policy: &dyn LookupPolicy,
) -> WindResult<PointSeries> {
    let axes = field.axes();
    let lat_idx = axes.latitude_index(latitude, policy)?;
    let lon_idx = axes.longitude_index(longitude, policy)?;

    debug!(
        latitude = latitude,
        longitude = longitude,
        lat_idx = lat_idx,
        lon_idx = lon_idx,
        steps = axes.time().len(),
        "Extracting point series"
    );

    let mut readings = Vec::with_capacity(axes.time().len());
    let mut missing = Vec::with_capacity(axes.time().len());
    for t in 0..axes.time().len() {
        let sample = field
            .sample(t, lat_idx, lon_idx)
            .ok_or_else(|| out_of_range(t, lat_idx, lon_idx))?;

        let mut reading = decode_sample(sample);
        if !sample.is_missing() {
            reading.direction = to_blows_from(reading.direction);
        }
        readings.push(reading);
        missing.push(sample.is_missing());
    }

    Ok(PointSeries {
        latitude: axes.latitude()[lat_idx],
        longitude: axes.longitude()[lon_idx],
        times: axes.time().to_vec(),
        readings,
        missing,
    })
}

/// Decode every grid cell at the time step named by `timestamp`.
///
/// `timestamp` is parsed with [`wind_common::TIMESTAMP_FORMAT`] and converted
/// to hours since `reference.epoch`; the result must be present on the time
/// axis exactly.
pub fn extract_grid_snapshot(
    field: &WindField,
    timestamp: &str,
    reference: &TimeReference,
) -> WindResult<GridSnapshot> {
    let hours = reference.hours_since_str(timestamp)?;
    extract_grid_snapshot_at(field, hours)
}

/// Decode every grid cell at the time step `hours` since the dataset epoch.
pub fn extract_grid_snapshot_at(field: &WindField, hours: i64) -> WindResult<GridSnapshot> {
    let axes = field.axes();
    let time_idx = axes.time_index(hours)?;
    let (_, nlat, nlon) = axes.shape();

    debug!(
        hours = hours,
        time_idx = time_idx,
        cells = nlat * nlon,
        "Extracting grid snapshot"
    );

    let mut rows = Vec::with_capacity(nlat * nlon);
    for i in 0..nlat {
        for k in 0..nlon {
            let sample = field
                .sample(time_idx, i, k)
                .ok_or_else(|| out_of_range(time_idx, i, k))?;
            rows.push(GridRow {
                latitude: axes.latitude()[i],
                longitude: axes.longitude()[k],
                reading: decode_sample(sample),
            });
        }
    }

    Ok(GridSnapshot { time: hours, rows })
}

// WindField validates its shape on construction, so indices taken from its
// own axes are always in range.
fn out_of_range(t: usize, lat: usize, lon: usize) -> WindError {
    WindError::ShapeMismatch(format!("cell ({}, {}, {}) outside field", t, lat, lon))
}
