//! Loader tests against small NetCDF files written on the fly, plus an
//! optional check against a real CDS download.

use std::path::{Path, PathBuf};

use netcdf_parser::{load_era5_dataset, load_wind_field, NetCdfError, VariableNames};
use test_utils::{assert_approx_eq, era5, require_test_file, temp_test_dir};
use wind_common::{ExactMatch, TimeReference, MISSING_SENTINEL};

const LATS: [f32; 2] = [39.0, 38.75];
const LONS: [f32; 3] = [-10.0, -9.75, -9.5];

/// Classic CDS layout: int hours since 1900, packed shorts.
fn write_classic(dir: &Path) -> PathBuf {
    let path = dir.join("download_1960.nc");
    let mut file = netcdf::create(&path).unwrap();
    file.add_dimension("longitude", LONS.len()).unwrap();
    file.add_dimension("latitude", LATS.len()).unwrap();
    file.add_dimension("time", 2).unwrap();

    {
        let mut var = file.add_variable::<f32>("longitude", &["longitude"]).unwrap();
        var.put_attribute("units", "degrees_east").unwrap();
        var.put_values(&LONS, ..).unwrap();
    }
    {
        let mut var = file.add_variable::<f32>("latitude", &["latitude"]).unwrap();
        var.put_attribute("units", "degrees_north").unwrap();
        var.put_values(&LATS, ..).unwrap();
    }
    {
        let mut var = file.add_variable::<i32>("time", &["time"]).unwrap();
        var.put_attribute("units", "hours since 1900-01-01 00:00:00.0").unwrap();
        var.put_attribute("calendar", "gregorian").unwrap();
        let hours = [era5::HOURS_1960 as i32, era5::HOURS_1960 as i32 + 1];
        var.put_values(&hours, ..).unwrap();
    }

    // Packed as raw * 0.5 + 0.25
    let u_raw: [i16; 12] = [1, 3, 5, 7, 9, 11, -32767, 1, 1, 1, 1, 1];
    let v_raw: [i16; 12] = [1; 12];
    for (name, raw) in [("u10", u_raw), ("v10", v_raw)] {
        let mut var = file
            .add_variable::<i16>(name, &["time", "latitude", "longitude"])
            .unwrap();
        var.put_attribute("scale_factor", 0.5f64).unwrap();
        var.put_attribute("add_offset", 0.25f64).unwrap();
        var.put_attribute("_FillValue", -32767i16).unwrap();
        var.put_attribute("missing_value", -32767i16).unwrap();
        var.put_attribute("units", "m s**-1").unwrap();
        var.put_values(&raw, ..).unwrap();
    }

    path
}

/// Newer CDS layout: int64 seconds since 1970 named `valid_time`, plain floats.
fn write_unpacked(dir: &Path, component_dims: &[&str]) -> PathBuf {
    let path = dir.join("download_unpacked.nc");
    let mut file = netcdf::create(&path).unwrap();
    file.add_dimension("valid_time", 3).unwrap();
    file.add_dimension("latitude", LATS.len()).unwrap();
    file.add_dimension("longitude", LONS.len()).unwrap();

    file.add_variable::<f64>("latitude", &["latitude"])
        .unwrap()
        .put_values(&LATS.map(f64::from), ..)
        .unwrap();
    file.add_variable::<f64>("longitude", &["longitude"])
        .unwrap()
        .put_values(&LONS.map(f64::from), ..)
        .unwrap();
    {
        let mut var = file.add_variable::<i64>("valid_time", &["valid_time"]).unwrap();
        var.put_attribute("units", "seconds since 1970-01-01").unwrap();
        var.put_values(&[0i64, 3600, 7200], ..).unwrap();
    }

    let cells = 3 * LATS.len() * LONS.len();
    for (name, value) in [("u10", -3.0f32), ("v10", 4.0f32)] {
        let mut data = vec![value; cells];
        data[cells - 1] = f32::NAN;
        let mut var = file.add_variable::<f32>(name, component_dims).unwrap();
        var.put_values(&data, ..).unwrap();
    }

    path
}

#[test]
fn test_load_classic_packed_file() {
    let dir = temp_test_dir();
    let path = write_classic(dir.path());

    let dataset = load_era5_dataset(&path, &VariableNames::default()).unwrap();
    let axes = dataset.field.axes();

    assert_eq!(axes.shape(), (2, 2, 3));
    assert_eq!(axes.time(), &[era5::HOURS_1960, era5::HOURS_1960 + 1]);
    assert_eq!(axes.latitude(), &[39.0, 38.75]);
    assert_eq!(axes.longitude(), &[-10.0, -9.75, -9.5]);
    assert_eq!(dataset.reference, TimeReference::era5());

    let sample = dataset.field.sample(0, 1, 2).unwrap();
    assert_approx_eq!(sample.u, 5.75, 1e-12);
    assert_approx_eq!(sample.v, 0.75, 1e-12);
}

#[test]
fn test_fill_value_becomes_sentinel() {
    let dir = temp_test_dir();
    let path = write_classic(dir.path());

    let field = load_wind_field(&path, &VariableNames::default()).unwrap();

    let sample = field.sample(1, 0, 0).unwrap();
    assert_eq!(sample.u, MISSING_SENTINEL);
    assert!(sample.is_missing());
    assert_eq!(field.missing_count(), 1);
}

#[test]
fn test_loaded_axes_resolve_exact_coordinates() {
    let dir = temp_test_dir();
    let path = write_classic(dir.path());
    let field = load_wind_field(&path, &VariableNames::default()).unwrap();

    let (lat, lon) = era5::POINT;
    assert_eq!(field.axes().latitude_index(lat, &ExactMatch).unwrap(), 1);
    assert_eq!(field.axes().longitude_index(lon, &ExactMatch).unwrap(), 2);
    assert_eq!(field.axes().time_index(era5::EXAMPLE_HOURS - 1).unwrap(), 1);
}

#[test]
fn test_load_unpacked_valid_time_file() {
    let dir = temp_test_dir();
    let path = write_unpacked(dir.path(), &["valid_time", "latitude", "longitude"]);

    let dataset = load_era5_dataset(&path, &VariableNames::default()).unwrap();

    assert_eq!(dataset.field.axes().time(), &[0, 1, 2]);
    assert_eq!(
        dataset.reference.epoch.format("%Y-%m-%d").to_string(),
        "1970-01-01"
    );
    let sample = dataset.field.sample(0, 0, 0).unwrap();
    assert_eq!((sample.u, sample.v), (-3.0, 4.0));
    // NaN cell
    assert!(dataset.field.sample(2, 1, 2).unwrap().is_missing());
}

#[test]
fn test_wrong_dimension_order_rejected() {
    let dir = temp_test_dir();
    let path = write_unpacked(dir.path(), &["latitude", "valid_time", "longitude"]);

    let err = load_wind_field(&path, &VariableNames::default()).unwrap_err();
    assert!(matches!(err, NetCdfError::InvalidFormat(_)));
    assert!(err.to_string().contains("u10"));
}

#[test]
fn test_custom_variable_names() {
    let dir = temp_test_dir();
    let path = write_classic(dir.path());

    let names = VariableNames {
        u: "u100".to_string(),
        ..Default::default()
    };
    let err = load_wind_field(&path, &names).unwrap_err();
    assert!(matches!(err, NetCdfError::MissingData(_)));

    let names = VariableNames {
        time: vec!["t".to_string()],
        ..Default::default()
    };
    let err = load_wind_field(&path, &names).unwrap_err();
    assert!(err.to_string().contains("time variable"));
}

#[test]
fn test_real_era5_download() {
    let path = require_test_file!("download_1960.nc");

    let dataset = load_era5_dataset(&path, &VariableNames::default()).unwrap();
    let axes = dataset.field.axes();

    // 1960 is a leap year: 366 days of hourly data
    assert_eq!(axes.time().len(), 366 * 24);
    assert_eq!(axes.time()[0], era5::HOURS_1960);
    let (lat, lon) = era5::POINT;
    assert!(axes.latitude_index(lat, &ExactMatch).is_ok());
    assert!(axes.longitude_index(lon, &ExactMatch).is_ok());
}
