//! Directional frequency tables ("windrose") built from a point series.
//!
//! Directions are split into equal sectors centred on north: with 16 sectors
//! the first one covers [348.75°, 11.25°). Speeds fall into bins given by
//! their lower edges; the last bin is open-ended.

use serde::{Deserialize, Serialize};
use wind_common::{WindError, WindResult};

use crate::extract::PointSeries;

/// Layout of a windrose table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindroseConfig {
    /// Number of direction sectors
    pub sectors: usize,
    /// Ascending lower edges of the speed bins, m/s
    pub speed_bins: Vec<f64>,
}

impl Default for WindroseConfig {
    fn default() -> Self {
        Self {
            sectors: 16,
            speed_bins: (0..16).map(f64::from).collect(),
        }
    }
}

impl WindroseConfig {
    pub fn validate(&self) -> WindResult<()> {
        if self.sectors == 0 {
            return Err(WindError::Config("windrose needs at least one sector".into()));
        }
        if self.speed_bins.is_empty() {
            return Err(WindError::Config("windrose needs at least one speed bin".into()));
        }
        if self.speed_bins.windows(2).any(|w| w[1] <= w[0]) {
            return Err(WindError::Config(
                "speed bins must be strictly ascending".into(),
            ));
        }
        Ok(())
    }

    /// Angular width of one sector in degrees.
    pub fn sector_width(&self) -> f64 {
        360.0 / self.sectors as f64
    }

    fn sector_of(&self, direction: f64) -> usize {
        let width = self.sector_width();
        let shifted = (direction + width / 2.0).rem_euclid(360.0);
        ((shifted / width) as usize) % self.sectors
    }

    fn bin_of(&self, speed: f64) -> Option<usize> {
        if speed < self.speed_bins[0] {
            return None;
        }
        Some(self.speed_bins.partition_point(|&edge| edge <= speed) - 1)
    }
}

/// Sample counts per (sector, speed bin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindroseTable {
    pub latitude: f64,
    pub longitude: f64,
    /// Centre direction of each sector, degrees
    pub sector_centres: Vec<f64>,
    pub speed_bins: Vec<f64>,
    /// `counts[sector][bin]`
    pub counts: Vec<Vec<u64>>,
    /// Samples that fell into some bin
    pub total: u64,
    /// Missing steps, left out of every bin
    pub missing: u64,
}

impl WindroseTable {
    pub fn from_series(series: &PointSeries, config: &WindroseConfig) -> WindResult<Self> {
        config.validate()?;

        let mut counts = vec![vec![0u64; config.speed_bins.len()]; config.sectors];
        let mut total = 0;
        for (direction, speed) in series.present_pairs() {
            if !direction.is_finite() {
                continue;
            }
            if let Some(bin) = config.bin_of(speed) {
                counts[config.sector_of(direction)][bin] += 1;
                total += 1;
            }
        }

        let width = config.sector_width();
        Ok(Self {
            latitude: series.latitude,
            longitude: series.longitude,
            sector_centres: (0..config.sectors).map(|s| s as f64 * width).collect(),
            speed_bins: config.speed_bins.clone(),
            counts,
            total,
            missing: series.missing_count() as u64,
        })
    }

    /// Counts as percentages of `total`. All zeros for an empty table.
    pub fn frequencies(&self) -> Vec<Vec<f64>> {
        let total = self.total as f64;
        self.counts
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&c| if total > 0.0 { c as f64 * 100.0 / total } else { 0.0 })
                    .collect()
            })
            .collect()
    }

    /// Percentage of samples per sector across all speed bins.
    pub fn sector_frequencies(&self) -> Vec<f64> {
        self.frequencies().iter().map(|row| row.iter().sum()).collect()
    }

    /// Index of the sector holding the most samples.
    pub fn prevailing_sector(&self) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        self.counts
            .iter()
            .map(|row| row.iter().sum::<u64>())
            .enumerate()
            .max_by_key(|&(_, count)| count)
            .map(|(idx, _)| idx)
    }
}
