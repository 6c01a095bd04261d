//! ERA5 single-levels NetCDF loading.
//!
//! A CDS download holds one cube per wind component, dimensioned
//! `(time, latitude, longitude)`, plus the three coordinate variables. This
//! module reads all five into a validated [`WindField`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wind_common::{CfTimeUnits, GridAxes, TimeReference, TimeUnit, WindField, MISSING_SENTINEL};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{
    dimension_names, get_f64_attr, get_string_attr, read_values_f64, require_variable,
    silence_hdf5_errors,
};

/// Names of the variables to read from a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableNames {
    /// Eastward wind component
    pub u: String,
    /// Northward wind component
    pub v: String,
    pub latitude: String,
    pub longitude: String,
    /// Time variable candidates, first present wins
    pub time: Vec<String>,
}

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            u: "u10".to_string(),
            v: "v10".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            time: vec!["time".to_string(), "valid_time".to_string()],
        }
    }
}

/// A loaded wind field together with the epoch of its time axis.
#[derive(Debug, Clone)]
pub struct Era5Dataset {
    pub field: WindField,
    pub reference: TimeReference,
}

/// Load the U/V wind field from an ERA5 NetCDF file.
pub fn load_wind_field<P: AsRef<Path>>(path: P, names: &VariableNames) -> NetCdfResult<WindField> {
    load_era5_dataset(path, names).map(|dataset| dataset.field)
}

/// Load the U/V wind field and the time reference declared by the file.
///
/// The time axis is converted to whole hours since the epoch named in its
/// CF `units` attribute; without one, hours since 1900-01-01 are assumed.
pub fn load_era5_dataset<P: AsRef<Path>>(
    path: P,
    names: &VariableNames,
) -> NetCdfResult<Era5Dataset> {
    silence_hdf5_errors();

    let path = path.as_ref();
    let nc_file = netcdf::open(path).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to open NetCDF {}: {}", path.display(), e))
    })?;

    let time_name = names
        .time
        .iter()
        .find(|name| nc_file.variable(name).is_some())
        .ok_or_else(|| {
            NetCdfError::MissingData(format!("time variable (tried {})", names.time.join(", ")))
        })?;

    let (time, units) = read_time_axis(&nc_file, time_name)?;
    let latitude = read_values_f64(&require_variable(&nc_file, &names.latitude)?)?;
    let longitude = read_values_f64(&require_variable(&nc_file, &names.longitude)?)?;

    let expected_dims = [
        time_name.as_str(),
        names.latitude.as_str(),
        names.longitude.as_str(),
    ];
    let u = read_component(&nc_file, &names.u, &expected_dims)?;
    let v = read_component(&nc_file, &names.v, &expected_dims)?;

    let axes = GridAxes::new(time, latitude, longitude)?;
    let (nt, nlat, nlon) = axes.shape();
    let field = WindField::new(axes, u, v)?;

    info!(
        path = %path.display(),
        time_steps = nt,
        latitudes = nlat,
        longitudes = nlon,
        missing = field.missing_count(),
        epoch = %units.reference.epoch,
        "Loaded ERA5 wind field"
    );

    Ok(Era5Dataset {
        field,
        reference: units.reference,
    })
}

fn read_time_axis(nc_file: &netcdf::File, name: &str) -> NetCdfResult<(Vec<i64>, CfTimeUnits)> {
    let var = require_variable(nc_file, name)?;

    let units = match get_string_attr(&var, "units") {
        Some(text) => CfTimeUnits::parse(&text)?,
        None => CfTimeUnits {
            unit: TimeUnit::Hours,
            reference: TimeReference::era5(),
        },
    };

    let hours = read_values_f64(&var)?
        .into_iter()
        .map(|raw| {
            if raw.fract() != 0.0 || !raw.is_finite() {
                return Err(NetCdfError::InvalidFormat(format!(
                    "{} value {} is not an integer offset",
                    name, raw
                )));
            }
            Ok(units.to_hours(raw as i64)?)
        })
        .collect::<NetCdfResult<Vec<i64>>>()?;

    debug!(variable = name, steps = hours.len(), unit = ?units.unit, "Read time axis");
    Ok((hours, units))
}

/// Read one wind component, unpacking it and replacing fill values with
/// [`MISSING_SENTINEL`].
fn read_component(
    nc_file: &netcdf::File,
    name: &str,
    expected_dims: &[&str; 3],
) -> NetCdfResult<Vec<f64>> {
    let var = require_variable(nc_file, name)?;

    let dims = dimension_names(&var);
    if dims.iter().map(String::as_str).ne(expected_dims.iter().copied()) {
        return Err(NetCdfError::InvalidFormat(format!(
            "{} has dimensions ({}), expected ({})",
            name,
            dims.join(", "),
            expected_dims.join(", ")
        )));
    }

    let scale_factor = get_f64_attr(&var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f64_attr(&var, "add_offset").unwrap_or(0.0);
    let fill_value = get_f64_attr(&var, "_FillValue");
    let missing_value = get_f64_attr(&var, "missing_value");

    debug!(
        variable = name,
        scale_factor = scale_factor,
        add_offset = add_offset,
        fill_value = ?fill_value,
        missing_value = ?missing_value,
        "Unpacking wind component"
    );

    let data = read_values_f64(&var)?
        .into_iter()
        .map(|raw| {
            if !raw.is_finite() || Some(raw) == fill_value || Some(raw) == missing_value {
                MISSING_SENTINEL
            } else {
                raw * scale_factor + add_offset
            }
        })
        .collect();

    Ok(data)
}
