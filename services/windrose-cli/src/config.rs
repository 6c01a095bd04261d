//! CLI configuration.
//!
//! Loaded from an optional YAML file; every field has a default, so a
//! missing file or a partial one is fine:
//!
//! ```yaml
//! data_dir: /data/era5
//! file_template: "download_{year}.nc"
//! variables:
//!   u: u10
//!   v: v10
//! windrose:
//!   sectors: 16
//!   speed_bins: [0, 2, 4, 6, 8, 10]
//! output_dir: out
//! grid_output: file_wind_grid.txt
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use netcdf_parser::VariableNames;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wind_processor::WindroseConfig;

/// Settings shared by the `point` and `grid` commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Variable names inside the NetCDF files
    pub variables: VariableNames,
    /// Directory holding the yearly input files
    pub data_dir: PathBuf,
    /// Input file name, `{year}` is substituted
    pub file_template: String,
    /// Replaces the epoch declared by the file's time units
    pub epoch: Option<NaiveDateTime>,
    pub windrose: WindroseConfig,
    /// Directory for generated files
    pub output_dir: PathBuf,
    /// File name of the grid snapshot export
    pub grid_output: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            variables: VariableNames::default(),
            data_dir: PathBuf::from("."),
            file_template: "download_{year}.nc".to_string(),
            epoch: None,
            windrose: WindroseConfig::default(),
            output_dir: PathBuf::from("."),
            grid_output: "file_wind_grid.txt".to_string(),
        }
    }
}

impl CliConfig {
    /// Load a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: CliConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .windrose
            .validate()
            .with_context(|| format!("Invalid windrose settings in {}", path.display()))?;

        debug!(path = %path.display(), "Loaded CLI config");
        Ok(config)
    }

    /// Load `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Input file for a calendar year.
    pub fn input_for_year(&self, year: i32) -> PathBuf {
        self.data_dir
            .join(self.file_template.replace("{year}", &year.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.input_for_year(1960), PathBuf::from("./download_1960.nc"));
        assert_eq!(config.grid_output, "file_wind_grid.txt");
        assert_eq!(config.windrose.sectors, 16);
        assert!(config.epoch.is_none());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
data_dir: /data/era5
variables:
  time: [valid_time]
windrose:
  sectors: 8
epoch: "1900-01-01T00:00:00"
"#;
        let config: CliConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.input_for_year(1959),
            PathBuf::from("/data/era5/download_1959.nc")
        );
        assert_eq!(config.variables.u, "u10");
        assert_eq!(config.variables.time, vec!["valid_time"]);
        assert_eq!(config.windrose.sectors, 8);
        assert_eq!(config.windrose.speed_bins.len(), 16);
        assert!(config.epoch.is_some());
    }

    #[test]
    fn test_invalid_windrose_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("windrose.yaml");
        std::fs::write(&path, "windrose:\n  sectors: 0\n").unwrap();
        assert!(CliConfig::load(&path).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        assert!(CliConfig::load_or_default(Some(Path::new("/nonexistent.yaml"))).is_err());
        assert!(CliConfig::load_or_default(None).is_ok());
    }
}
