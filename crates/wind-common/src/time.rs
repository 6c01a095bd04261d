//! Time handling for reanalysis time axes.
//!
//! ERA5 encodes its time axis as integer hours elapsed since a fixed epoch
//! (1900-01-01 00:00 for the classic CDS NetCDF files). Requests arrive as
//! wall-clock timestamps in `day/month/year hour:minute:second.microsecond`
//! form and are converted to the same hour count before lookup.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{Axis, WindError, WindResult};

/// Format of user-supplied timestamps, e.g. `1/01/1960 02:00:00.000000`.
///
/// The fractional-seconds part is optional when parsing.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S%.f";

const SECONDS_PER_HOUR: i64 = 3600;

/// Parse a wall-clock timestamp in [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(input: &str) -> WindResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        WindError::MalformedTimestamp {
            input: input.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Fixed epoch origin of an hours-since-epoch time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeReference {
    pub epoch: NaiveDateTime,
}

impl TimeReference {
    pub fn new(epoch: NaiveDateTime) -> Self {
        Self { epoch }
    }

    /// The ERA5 origin, 1900-01-01 00:00:00.
    pub fn era5() -> Self {
        let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self { epoch }
    }

    /// Whole hours between the epoch and `timestamp`, truncated toward zero.
    pub fn hours_since(&self, timestamp: NaiveDateTime) -> i64 {
        (timestamp - self.epoch).num_seconds() / SECONDS_PER_HOUR
    }

    /// Parse `input` and convert it to hours since the epoch.
    pub fn hours_since_str(&self, input: &str) -> WindResult<i64> {
        parse_timestamp(input).map(|ts| self.hours_since(ts))
    }

    /// Wall-clock time of an axis value.
    pub fn datetime_at(&self, hours: i64) -> NaiveDateTime {
        self.epoch + TimeDelta::hours(hours)
    }
}

impl Default for TimeReference {
    fn default() -> Self {
        Self::era5()
    }
}

/// Unit of a CF-style time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(TimeUnit::Seconds),
            "min" | "mins" | "minute" | "minutes" => Some(TimeUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(TimeUnit::Hours),
            "d" | "day" | "days" => Some(TimeUnit::Days),
            _ => None,
        }
    }

    pub fn seconds(&self) -> i64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => SECONDS_PER_HOUR,
            TimeUnit::Days => 24 * SECONDS_PER_HOUR,
        }
    }
}

/// Parsed CF `units` attribute of a time variable, e.g.
/// `hours since 1900-01-01 00:00:00.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfTimeUnits {
    pub unit: TimeUnit,
    pub reference: TimeReference,
}

impl CfTimeUnits {
    pub fn parse(units: &str) -> WindResult<Self> {
        let invalid = || WindError::InvalidTimeUnits(units.to_string());

        let (unit, origin) = units.trim().split_once(" since ").ok_or_else(invalid)?;
        let unit = TimeUnit::from_name(unit.trim()).ok_or_else(invalid)?;
        let epoch = parse_cf_origin(origin.trim()).ok_or_else(invalid)?;

        Ok(Self {
            unit,
            reference: TimeReference::new(epoch),
        })
    }

    /// Convert one raw axis value to whole hours since the reference epoch.
    ///
    /// Values that do not land on a whole hour are rejected rather than rounded,
    /// since the axis is matched by exact equality.
    pub fn to_hours(&self, raw: i64) -> WindResult<i64> {
        let seconds = raw * self.unit.seconds();
        if seconds % SECONDS_PER_HOUR != 0 {
            return Err(WindError::invalid_axis(
                Axis::Time,
                format!("value {} {:?} is not a whole hour", raw, self.unit),
            ));
        }
        Ok(seconds / SECONDS_PER_HOUR)
    }
}

fn parse_cf_origin(origin: &str) -> Option<NaiveDateTime> {
    // Trailing zone designators ("UTC", "Z") carry no offset for reanalysis output.
    let origin = origin
        .trim_end_matches(" UTC")
        .trim_end_matches('Z')
        .trim();

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(origin, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(origin, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_with_micros() {
        let ts = parse_timestamp("1/01/1960 02:00:00.000000").unwrap();
        assert_eq!(ts.year(), 1960);
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 1);
        assert_eq!(ts.hour(), 2);
    }

    #[test]
    fn test_parse_timestamp_without_fraction() {
        let ts = parse_timestamp("15/07/1959 18:00:00").unwrap();
        assert_eq!(ts.month(), 7);
        assert_eq!(ts.hour(), 18);
    }

    #[test]
    fn test_parse_timestamp_rejects_iso() {
        let err = parse_timestamp("1960-01-01T02:00:00").unwrap_err();
        assert!(matches!(err, WindError::MalformedTimestamp { .. }));
    }

    #[test]
    fn test_era5_hours_since() {
        let reference = TimeReference::era5();
        // 60 years with 14 leap days, plus two hours
        let expected = (60 * 365 + 14) * 24 + 2;
        assert_eq!(
            reference.hours_since_str("1/01/1960 02:00:00.000000").unwrap(),
            expected
        );
    }

    #[test]
    fn test_hours_truncate_partial_hour() {
        let reference = TimeReference::era5();
        let whole = reference.hours_since_str("1/01/1960 02:00:00").unwrap();
        let partial = reference.hours_since_str("1/01/1960 02:59:59.999999").unwrap();
        assert_eq!(whole, partial);
    }

    #[test]
    fn test_datetime_at_inverts_hours_since() {
        let reference = TimeReference::era5();
        let ts = parse_timestamp("31/12/1960 23:00:00.000000").unwrap();
        assert_eq!(reference.datetime_at(reference.hours_since(ts)), ts);
    }

    #[test]
    fn test_cf_units_hours() {
        let units = CfTimeUnits::parse("hours since 1900-01-01 00:00:00.0").unwrap();
        assert_eq!(units.unit, TimeUnit::Hours);
        assert_eq!(units.reference, TimeReference::era5());
        assert_eq!(units.to_hours(525_960).unwrap(), 525_960);
    }

    #[test]
    fn test_cf_units_seconds() {
        let units = CfTimeUnits::parse("seconds since 1970-01-01").unwrap();
        assert_eq!(units.unit, TimeUnit::Seconds);
        assert_eq!(units.to_hours(7200).unwrap(), 2);
        assert!(units.to_hours(7201).is_err());
    }

    #[test]
    fn test_cf_units_invalid() {
        assert!(CfTimeUnits::parse("fortnights since 1900-01-01").is_err());
        assert!(CfTimeUnits::parse("hours").is_err());
    }
}
