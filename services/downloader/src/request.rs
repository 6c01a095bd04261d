//! ERA5 single-levels request bodies.
//!
//! One request covers one calendar year of hourly 10 m wind components over
//! a rectangular area. Days that do not exist in a month are ignored by the
//! archive, so every request lists all 31.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

/// CDS dataset name for surface-level ERA5 reanalysis.
pub const DATASET: &str = "reanalysis-era5-single-levels";

/// Wind component variables requested for every year.
pub const WIND_VARIABLES: [&str; 2] = ["10m_u_component_of_wind", "10m_v_component_of_wind"];

/// Bounding box as the archive expects it: north, west, south, east.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", try_from = "[f64; 4]")]
pub struct Area {
    pub north: f64,
    pub west: f64,
    pub south: f64,
    pub east: f64,
}

impl Area {
    pub fn new(north: f64, west: f64, south: f64, east: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&north) || !(-90.0..=90.0).contains(&south) {
            bail!("latitudes must lie within [-90, 90]");
        }
        if south > north {
            bail!("south edge {} is above north edge {}", south, north);
        }
        Ok(Self {
            north,
            west,
            south,
            east,
        })
    }
}

impl Default for Area {
    /// North Atlantic off the Iberian peninsula.
    fn default() -> Self {
        Self {
            north: 50.0,
            west: -45.0,
            south: 15.0,
            east: 0.0,
        }
    }
}

impl From<Area> for [f64; 4] {
    fn from(area: Area) -> Self {
        [area.north, area.west, area.south, area.east]
    }
}

impl TryFrom<[f64; 4]> for Area {
    type Error = anyhow::Error;

    fn try_from([north, west, south, east]: [f64; 4]) -> Result<Self> {
        Area::new(north, west, south, east)
    }
}

impl FromStr for Area {
    type Err = anyhow::Error;

    /// Parses `N,W,S,E`.
    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow!("invalid area '{}': {}", s, e))?;

        match parts.as_slice() {
            [north, west, south, east] => Area::new(*north, *west, *south, *east),
            _ => bail!("area '{}' must have four values: north,west,south,east", s),
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.north, self.west, self.south, self.east)
    }
}

/// JSON body of a retrieve call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Era5Request {
    pub product_type: String,
    pub format: String,
    pub variable: Vec<String>,
    pub year: String,
    pub month: Vec<String>,
    pub day: Vec<String>,
    pub time: Vec<String>,
    pub area: Area,
}

impl Era5Request {
    /// Every hour of `year` over `area`, as NetCDF.
    pub fn for_year(year: i32, area: Area) -> Self {
        Self {
            product_type: "reanalysis".to_string(),
            format: "netcdf".to_string(),
            variable: WIND_VARIABLES.iter().map(|v| v.to_string()).collect(),
            year: year.to_string(),
            month: (1..=12).map(|m| format!("{:02}", m)).collect(),
            day: (1..=31).map(|d| format!("{:02}", d)).collect(),
            time: (0..24).map(|h| format!("{:02}:00", h)).collect(),
            area,
        }
    }
}

/// Output file name for a year, e.g. `download_1960.nc`.
pub fn file_name(year: i32) -> String {
    format!("download_{}.nc", year)
}
