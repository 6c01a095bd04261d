//! The `point` and `grid` workflows.
//!
//! Loading is separated from processing so the processing half can run on
//! any [`WindField`], not only one read from disk.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDateTime};
use netcdf_parser::{load_era5_dataset, Era5Dataset};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;
use wind_common::{
    parse_timestamp, ExactMatch, LookupPolicy, TimeReference, WindField, WithinTolerance,
};
use wind_processor::{
    export_grid_snapshot, extract_grid_snapshot, extract_point_series, GridSnapshot,
    PointSeries, WindroseConfig, WindroseTable,
};

use crate::config::CliConfig;

/// A `LAT,LON` pair from the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl FromStr for Coordinate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LON but got '{}'", s))?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid latitude '{}': {}", lat, e))?;
        let longitude = lon
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid longitude '{}': {}", lon, e))?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("latitude {} outside [-90, 90]", latitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Options of the `point` command after argument parsing.
#[derive(Debug, Clone)]
pub struct PointOptions {
    pub points: Vec<Coordinate>,
    pub input: PathBuf,
    /// Snap to the nearest axis value within this many degrees
    pub tolerance: Option<f64>,
    pub output_dir: PathBuf,
    /// Also write each decoded series
    pub write_series: bool,
}

/// What gets written to `windrose_<lat>_<lon>.json`.
#[derive(Debug, Clone, Serialize)]
pub struct WindroseReport {
    #[serde(flatten)]
    pub table: WindroseTable,
    /// Percent of samples per (sector, speed bin)
    pub frequencies: Vec<Vec<f64>>,
    pub sector_frequencies: Vec<f64>,
    /// Centre of the busiest sector, degrees
    pub prevailing_direction: Option<f64>,
}

impl WindroseReport {
    pub fn new(table: WindroseTable) -> Self {
        let prevailing_direction = table
            .prevailing_sector()
            .map(|idx| table.sector_centres[idx]);
        Self {
            frequencies: table.frequencies(),
            sector_frequencies: table.sector_frequencies(),
            prevailing_direction,
            table,
        }
    }
}

/// What gets written to `series_<lat>_<lon>.json`.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesReport<'a> {
    pub epoch: NaiveDateTime,
    #[serde(flatten)]
    pub series: &'a PointSeries,
}

/// Decoded series and windrose for one requested point.
#[derive(Debug, Clone)]
pub struct PointResult {
    pub requested: Coordinate,
    pub series: PointSeries,
    pub report: WindroseReport,
}

/// `windrose_38.75_-9.5.json`
pub fn windrose_file_name(latitude: f64, longitude: f64) -> String {
    format!("windrose_{}_{}.json", latitude, longitude)
}

/// `series_38.75_-9.5.json`
pub fn series_file_name(latitude: f64, longitude: f64) -> String {
    format!("series_{}_{}.json", latitude, longitude)
}

fn lookup_policy(tolerance: Option<f64>) -> Box<dyn LookupPolicy> {
    match tolerance {
        Some(tolerance) => Box::new(WithinTolerance::new(tolerance)),
        None => Box::new(ExactMatch),
    }
}

/// Decode every point in parallel and bin each series into a windrose.
///
/// Fails as a whole if any point is missing from the grid.
pub fn process_points(
    field: &WindField,
    points: &[Coordinate],
    tolerance: Option<f64>,
    windrose: &WindroseConfig,
) -> Result<Vec<PointResult>> {
    let policy = lookup_policy(tolerance);
    let policy = policy.as_ref();

    points
        .par_iter()
        .map(|&requested| -> Result<PointResult> {
            let series =
                extract_point_series(field, requested.latitude, requested.longitude, policy)
                    .with_context(|| format!("point {}", requested))?;
            let table = WindroseTable::from_series(&series, windrose)?;
            Ok(PointResult {
                requested,
                series,
                report: WindroseReport::new(table),
            })
        })
        .collect()
}

/// Write the JSON outputs of each point, returning the files written.
pub fn write_point_results(
    results: &[PointResult],
    reference: &TimeReference,
    output_dir: &Path,
    write_series: bool,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut written = Vec::new();
    for result in results {
        let (lat, lon) = (result.series.latitude, result.series.longitude);

        let path = output_dir.join(windrose_file_name(lat, lon));
        write_json(&path, &result.report)?;
        written.push(path);

        if write_series {
            let path = output_dir.join(series_file_name(lat, lon));
            let report = SeriesReport {
                epoch: reference.epoch,
                series: &result.series,
            };
            write_json(&path, &report)?;
            written.push(path);
        }

        info!(
            latitude = lat,
            longitude = lon,
            samples = result.series.len(),
            prevailing = ?result.report.prevailing_direction,
            "Wrote windrose"
        );
    }
    Ok(written)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn load(path: &Path, config: &CliConfig) -> Result<Era5Dataset> {
    if !path.exists() {
        bail!("input file {} not found", path.display());
    }
    let mut dataset = load_era5_dataset(path, &config.variables)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    if let Some(epoch) = config.epoch {
        dataset.reference = TimeReference::new(epoch);
    }
    Ok(dataset)
}

/// `windrose point`: per-point windrose tables, optionally with the series.
pub fn run_point(options: &PointOptions, config: &CliConfig) -> Result<Vec<PathBuf>> {
    let dataset = load(&options.input, config)?;

    let results = process_points(
        &dataset.field,
        &options.points,
        options.tolerance,
        &config.windrose,
    )?;

    write_point_results(
        &results,
        &dataset.reference,
        &options.output_dir,
        options.write_series,
    )
}

/// Decode the snapshot named by `timestamp` and export it to `output`.
pub fn snapshot_to_file(
    field: &WindField,
    timestamp: &str,
    reference: &TimeReference,
    output: &Path,
) -> Result<GridSnapshot> {
    let snapshot = extract_grid_snapshot(field, timestamp, reference)
        .with_context(|| format!("timestamp {}", timestamp))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    export_grid_snapshot(&snapshot, output)?;
    Ok(snapshot)
}

/// `windrose grid`: export every cell at one timestamp.
///
/// Without an explicit input the file is chosen from the timestamp's year.
pub fn run_grid(
    timestamp: &str,
    input: Option<&Path>,
    output: Option<&Path>,
    config: &CliConfig,
) -> Result<PathBuf> {
    // Malformed timestamps fail before any file is opened.
    let parsed = parse_timestamp(timestamp)?;

    let input = input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.input_for_year(parsed.year()));
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output_dir.join(&config.grid_output));

    let dataset = load(&input, config)?;
    snapshot_to_file(&dataset.field, timestamp, &dataset.reference, &output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        let c: Coordinate = "38.75,-9.5".parse().unwrap();
        assert_eq!(c.latitude, 38.75);
        assert_eq!(c.longitude, -9.5);
        assert_eq!(c.to_string(), "38.75,-9.5");

        let c: Coordinate = " -10 , 5.25 ".parse().unwrap();
        assert_eq!((c.latitude, c.longitude), (-10.0, 5.25));

        assert!("38.75".parse::<Coordinate>().is_err());
        assert!("a,b".parse::<Coordinate>().is_err());
        assert!("91,0".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_output_file_names() {
        assert_eq!(windrose_file_name(38.75, -9.5), "windrose_38.75_-9.5.json");
        assert_eq!(series_file_name(40.0, 0.0), "series_40_0.json");
    }

    #[test]
    fn test_grid_rejects_malformed_timestamp_before_io() {
        let config = CliConfig {
            data_dir: PathBuf::from("/nonexistent"),
            ..Default::default()
        };
        let err = run_grid("1960-01-01 02:00", None, None, &config).unwrap_err();
        assert!(err.to_string().contains("malformed timestamp"));
    }

    #[test]
    fn test_grid_reports_missing_input() {
        let config = CliConfig {
            data_dir: PathBuf::from("/nonexistent"),
            ..Default::default()
        };
        let err = run_grid("1/01/1960 02:00:00.000000", None, None, &config).unwrap_err();
        assert!(err.to_string().contains("download_1960.nc"));
    }
}
