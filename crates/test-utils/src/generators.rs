//! Synthetic wind-field generators.
//!
//! Every generator produces a flat row-major `[time][lat][lon]` cube with
//! predictable values so tests can compute expected results by hand.

use wind_common::{GridAxes, WindField, MISSING_SENTINEL};

/// Builds axes on a regular grid.
///
/// Latitudes run north to south from `north` in steps of `step` degrees, the
/// way ERA5 stores them; longitudes run west to east from `west`. Time values
/// are consecutive hours starting at `first_hour`.
pub fn era5_style_axes(
    first_hour: i64,
    steps: usize,
    north: f64,
    west: f64,
    step: f64,
    nlat: usize,
    nlon: usize,
) -> GridAxes {
    let time = (0..steps as i64).map(|t| first_hour + t).collect();
    let latitude = (0..nlat).map(|i| north - i as f64 * step).collect();
    let longitude = (0..nlon).map(|k| west + k as f64 * step).collect();
    GridAxes::new(time, latitude, longitude).expect("generated axes are monotonic")
}

/// A field where every cell holds the same (u, v).
pub fn uniform_wind_field(axes: GridAxes, u: f64, v: f64) -> WindField {
    let len = axes.len();
    WindField::new(axes, vec![u; len], vec![v; len]).expect("generated shape matches axes")
}

/// A field whose components encode their own position.
///
/// `u = t * 100 + lat_idx * 10 + lon_idx` and `v = -u`, so a decoded cell can
/// be traced back to the indices it came from.
pub fn indexed_wind_field(axes: GridAxes) -> WindField {
    let (nt, nlat, nlon) = axes.shape();
    let mut u = Vec::with_capacity(axes.len());
    for t in 0..nt {
        for i in 0..nlat {
            for k in 0..nlon {
                u.push((t * 100 + i * 10 + k) as f64);
            }
        }
    }
    let v = u.iter().map(|value| -value).collect();
    WindField::new(axes, u, v).expect("generated shape matches axes")
}

/// A field rotating through the compass one step per hour.
///
/// At time index `t` the wind heads toward `t * degrees_per_step` degrees
/// (clockwise from north) at `speed` m/s, identically at every cell.
pub fn rotating_wind_field(axes: GridAxes, speed: f64, degrees_per_step: f64) -> WindField {
    let (nt, nlat, nlon) = axes.shape();
    let cells = nlat * nlon;
    let mut u = Vec::with_capacity(axes.len());
    let mut v = Vec::with_capacity(axes.len());
    for t in 0..nt {
        let heading = (t as f64 * degrees_per_step).to_radians();
        for _ in 0..cells {
            u.push(speed * heading.sin());
            v.push(speed * heading.cos());
        }
    }
    WindField::new(axes, u, v).expect("generated shape matches axes")
}

/// Replace the U component at time index `t` with the missing sentinel at
/// every cell.
pub fn with_missing_step(field: &WindField, t: usize) -> WindField {
    let axes = field.axes().clone();
    let (nt, nlat, nlon) = axes.shape();
    let mut u = Vec::with_capacity(axes.len());
    let mut v = Vec::with_capacity(axes.len());
    for step in 0..nt {
        for i in 0..nlat {
            for k in 0..nlon {
                let sample = field.sample(step, i, k).expect("indices within shape");
                u.push(if step == t { MISSING_SENTINEL } else { sample.u });
                v.push(sample.v);
            }
        }
    }
    WindField::new(axes, u, v).expect("generated shape matches axes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_era5_style_axes() {
        let axes = era5_style_axes(525_936, 24, 50.0, -45.0, 0.25, 5, 4);
        assert_eq!(axes.shape(), (24, 5, 4));
        assert_eq!(axes.time()[0], 525_936);
        assert_eq!(axes.latitude()[4], 49.0);
        assert_eq!(axes.longitude()[3], -44.25);
    }

    #[test]
    fn test_indexed_field_traceable() {
        let field = indexed_wind_field(era5_style_axes(0, 2, 1.0, 0.0, 1.0, 2, 3));
        let sample = field.sample(1, 1, 2).unwrap();
        assert_eq!(sample.u, 112.0);
        assert_eq!(sample.v, -112.0);
    }

    #[test]
    fn test_with_missing_step() {
        let field = uniform_wind_field(era5_style_axes(0, 3, 1.0, 0.0, 1.0, 2, 2), 1.0, 1.0);
        let field = with_missing_step(&field, 1);
        assert_eq!(field.missing_count(), 4);
        assert!(field.sample(1, 0, 0).unwrap().is_missing());
        assert!(!field.sample(2, 0, 0).unwrap().is_missing());
    }
}
