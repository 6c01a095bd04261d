//! Low-level helpers over the native netcdf library.
//!
//! The `netcdf` crate wraps libnetcdf/HDF5 and reads variables in their
//! stored numeric type. ERA5 files come in two flavours: classic CDS output
//! packs wind components as `short` with `scale_factor`/`add_offset`, newer
//! output stores plain `float`. These helpers read either into `f64`.

use std::sync::Once;

use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when probing a variable with
/// the wrong numeric type). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// Safe to call multiple times; only the first call does anything. Call it
/// early, before any HDF5/NetCDF operations occur.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Look up a variable, mapping absence to [`NetCdfError::MissingData`].
pub(crate) fn require_variable<'f>(
    file: &'f netcdf::File,
    name: &str,
) -> NetCdfResult<netcdf::Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))
}

/// Names of a variable's dimensions, outermost first.
pub(crate) fn dimension_names(var: &netcdf::Variable) -> Vec<String> {
    var.dimensions().iter().map(|d| d.name()).collect()
}

/// Read every value of `var` as `f64`, whatever its stored numeric type.
///
/// Packed values are returned raw; unpacking is the caller's job.
pub(crate) fn read_values_f64(var: &netcdf::Variable) -> NetCdfResult<Vec<f64>> {
    if let Ok(values) = var.get_values::<f64, _>(..) {
        return Ok(values);
    }
    if let Ok(values) = var.get_values::<f32, _>(..) {
        return Ok(values.into_iter().map(f64::from).collect());
    }
    if let Ok(values) = var.get_values::<i16, _>(..) {
        return Ok(values.into_iter().map(f64::from).collect());
    }
    if let Ok(values) = var.get_values::<i32, _>(..) {
        return Ok(values.into_iter().map(f64::from).collect());
    }
    var.get_values::<i64, _>(..)
        .map(|values| values.into_iter().map(|v| v as f64).collect())
        .map_err(|e| {
            NetCdfError::InvalidFormat(format!(
                "Failed to read {} as a numeric array: {}",
                var.name(),
                e
            ))
        })
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get a numeric attribute widened to f64.
pub(crate) fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// Helper to get a text attribute.
pub(crate) fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(value) => Some(value),
        _ => None,
    }
}
