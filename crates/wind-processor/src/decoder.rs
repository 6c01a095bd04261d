//! Conversion of (U, V) wind components into direction and speed.
//!
//! The direction is the angle of the velocity vector measured clockwise from
//! north, i.e. the heading the air is moving *toward*. Use [`to_blows_from`]
//! for the meteorological "direction wind blows from" convention.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use wind_common::Sample;

/// Seconds per hour over metres per nautical mile.
pub const MS_TO_KNOTS: f64 = 3600.0 / 1852.0;

/// Direction and speed of one wind sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarReading {
    /// Degrees in [0, 360)
    pub direction: f64,
    /// Speed in m/s
    pub speed_ms: f64,
    /// Speed in knots
    pub speed_kt: f64,
}

impl PolarReading {
    /// The reading reported for a missing sample. Indistinguishable from a
    /// dead calm; check [`Sample::is_missing`] upstream when that matters.
    pub const MISSING: PolarReading = PolarReading {
        direction: 0.0,
        speed_ms: 0.0,
        speed_kt: 0.0,
    };
}

/// Which pair of sign conditions selected the angle.
///
/// The table is evaluated top to bottom and overlaps on the axes; the first
/// matching row wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quadrant {
    /// U ≥ 0, V ≥ 0
    NorthEast,
    /// U ≤ 0, V ≥ 0
    NorthWest,
    /// U ≥ 0, V ≤ 0
    SouthEast,
    /// U ≤ 0, V ≤ 0
    SouthWest,
}

impl Quadrant {
    /// Both components must be finite.
    fn of(u: f64, v: f64) -> Self {
        if u >= 0.0 && v >= 0.0 {
            Quadrant::NorthEast
        } else if u <= 0.0 && v >= 0.0 {
            Quadrant::NorthWest
        } else if u >= 0.0 && v <= 0.0 {
            Quadrant::SouthEast
        } else {
            // u < 0 and v < 0
            Quadrant::SouthWest
        }
    }

    fn angle(self, u: f64, v: f64) -> f64 {
        let raw = u.atan2(v);
        match self {
            Quadrant::NorthEast => raw,
            Quadrant::NorthWest => 2.0 * PI + raw,
            Quadrant::SouthEast => raw,
            Quadrant::SouthWest => 2.0 * PI + raw,
        }
    }
}

/// Decode one (U, V) pair.
///
/// Missing samples (sentinel or non-finite component) decode to
/// [`PolarReading::MISSING`].
pub fn decode(u: f64, v: f64) -> PolarReading {
    decode_sample(Sample::new(u, v))
}

/// Decode a [`Sample`], returning [`PolarReading::MISSING`] when
/// [`Sample::is_missing`] holds.
pub fn decode_sample(sample: Sample) -> PolarReading {
    if sample.is_missing() {
        return PolarReading::MISSING;
    }

    // -0.0 would select the SouthEast row with atan2(-0.0, v) = -π.
    let u = sample.u + 0.0;
    let v = sample.v + 0.0;

    let speed_ms = u.hypot(v);
    let speed_kt = speed_ms * MS_TO_KNOTS;

    let mut direction = Quadrant::of(u, v).angle(u, v).to_degrees();
    // 2π plus a vanishing negative angle rounds to a full turn.
    if direction >= 360.0 {
        direction -= 360.0;
    }

    PolarReading {
        direction,
        speed_ms,
        speed_kt,
    }
}

/// Convert a "blows toward" heading into the "blows from" convention.
///
/// Headings up to and including 180° are turned by +180°, larger ones by
/// -180°. A heading of exactly 180° maps to 0° rather than 360°.
pub fn to_blows_from(direction: f64) -> f64 {
    let flipped = if direction <= 180.0 {
        direction + 180.0
    } else {
        direction - 180.0
    };
    if flipped >= 360.0 {
        flipped - 360.0
    } else {
        flipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wind_common::MISSING_SENTINEL;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_decode_northeast_diagonal() {
        let reading = decode(1.0, 1.0);
        assert_close(reading.speed_ms, 2f64.sqrt());
        assert_close(reading.speed_kt, 2f64.sqrt() * 3600.0 / 1852.0);
        assert_close(reading.direction, 45.0);
        assert!((reading.speed_kt - 2.7497).abs() < 1e-4);
    }

    #[test]
    fn test_sentinel_on_either_component() {
        assert_eq!(decode(MISSING_SENTINEL, 0.5), PolarReading::MISSING);
        assert_eq!(decode(0.5, MISSING_SENTINEL), PolarReading::MISSING);
        assert_eq!(
            decode(MISSING_SENTINEL, MISSING_SENTINEL),
            PolarReading::MISSING
        );
    }

    #[test]
    fn test_nan_decodes_as_missing() {
        assert_eq!(decode(f64::NAN, 1.0), PolarReading::MISSING);
    }

    #[test]
    fn test_quadrants() {
        assert_close(decode(1.0, -1.0).direction, 135.0);
        assert_close(decode(-1.0, -1.0).direction, 225.0);
        assert_close(decode(-1.0, 1.0).direction, 315.0);
    }

    #[test]
    fn test_axis_cases() {
        assert_close(decode(0.0, 0.0).direction, 0.0);
        assert_close(decode(0.0, 3.0).direction, 0.0);
        assert_close(decode(3.0, 0.0).direction, 90.0);
        assert_close(decode(0.0, -3.0).direction, 180.0);
        assert_close(decode(-3.0, 0.0).direction, 270.0);
    }

    #[test]
    fn test_signed_zero_stays_in_range() {
        assert_close(decode(-0.0, -3.0).direction, 180.0);
        assert_close(decode(-0.0, 3.0).direction, 0.0);
        assert_close(decode(3.0, -0.0).direction, 90.0);
    }

    #[test]
    fn test_tiny_negative_u_does_not_reach_360() {
        let reading = decode(-1e-300, 1.0);
        assert!(reading.direction >= 0.0 && reading.direction < 360.0);
    }

    #[test]
    fn test_speed_at_extreme_magnitudes() {
        let huge = decode(1e200, 1e200);
        assert!(huge.speed_ms.is_finite());
        assert!((huge.speed_ms / 1e200 - 2f64.sqrt()).abs() < 1e-12);
        assert!(huge.speed_kt.is_finite());
        assert_close(huge.direction, 45.0);

        let tiny = decode(f64::MIN_POSITIVE, -f64::MIN_POSITIVE);
        assert!(tiny.speed_ms > 0.0);
        assert_close(tiny.direction, 135.0);
    }

    #[test]
    fn test_quadrant_rows_first_match_wins() {
        assert_eq!(Quadrant::of(0.0, 0.0), Quadrant::NorthEast);
        assert_eq!(Quadrant::of(-1.0, 0.0), Quadrant::NorthWest);
        assert_eq!(Quadrant::of(0.0, -1.0), Quadrant::SouthEast);
        assert_eq!(Quadrant::of(-1.0, -1.0), Quadrant::SouthWest);
    }

    #[test]
    fn test_direction_range_sweep() {
        for i in -20..=20 {
            for j in -20..=20 {
                let reading = decode(i as f64 * 0.7, j as f64 * 1.3);
                assert!(
                    (0.0..360.0).contains(&reading.direction),
                    "({}, {}) gave {}",
                    i,
                    j,
                    reading.direction
                );
            }
        }
    }

    #[test]
    fn test_blows_from_flip() {
        assert_close(to_blows_from(45.0), 225.0);
        assert_close(to_blows_from(225.0), 45.0);
        assert_close(to_blows_from(0.0), 180.0);
        assert_close(to_blows_from(180.0), 0.0);
        assert_close(to_blows_from(359.5), 179.5);
    }

    #[test]
    fn test_blows_from_is_involutive() {
        for tenth in 0..3600 {
            let direction = tenth as f64 / 10.0;
            let flipped = to_blows_from(direction);
            assert!((0.0..360.0).contains(&flipped));
            assert_close(to_blows_from(flipped), direction);
        }
    }
}
