//! Coordinate lookup policies for latitude/longitude axes.
//!
//! Extraction never interpolates: a requested coordinate must resolve to a
//! single axis position. [`ExactMatch`] requires the value to be literally
//! present on the axis; [`WithinTolerance`] is an explicit opt-in for callers
//! whose coordinates come from a lossy source (e.g. typed by hand from a
//! float32 axis).

/// Resolves a coordinate value to a position on an axis.
pub trait LookupPolicy: Send + Sync {
    /// Index of `target` on `axis`, or `None` when it does not resolve.
    fn locate(&self, axis: &[f64], target: f64) -> Option<usize>;
}

/// Exact floating-point equality. The default policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl LookupPolicy for ExactMatch {
    fn locate(&self, axis: &[f64], target: f64) -> Option<usize> {
        axis.iter().position(|&value| value == target)
    }
}

/// Matches the closest axis value within `tolerance` degrees.
#[derive(Debug, Clone, Copy)]
pub struct WithinTolerance {
    pub tolerance: f64,
}

impl WithinTolerance {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }
}

impl LookupPolicy for WithinTolerance {
    fn locate(&self, axis: &[f64], target: f64) -> Option<usize> {
        axis.iter()
            .enumerate()
            .map(|(idx, &value)| (idx, (value - target).abs()))
            .filter(|&(_, distance)| distance <= self.tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AXIS: [f64; 4] = [38.0, 38.25, 38.5, 38.75];

    #[test]
    fn test_exact_match_hit() {
        assert_eq!(ExactMatch.locate(&AXIS, 38.75), Some(3));
        assert_eq!(ExactMatch.locate(&AXIS, 38.0), Some(0));
    }

    #[test]
    fn test_exact_match_requires_literal_value() {
        assert_eq!(ExactMatch.locate(&AXIS, 38.7500001), None);
        assert_eq!(ExactMatch.locate(&[], 1.0), None);
    }

    #[test]
    fn test_exact_match_nan_never_matches() {
        assert_eq!(ExactMatch.locate(&AXIS, f64::NAN), None);
    }

    #[test]
    fn test_tolerance_picks_closest() {
        let policy = WithinTolerance::new(0.2);
        assert_eq!(policy.locate(&AXIS, 38.3), Some(1));
        assert_eq!(policy.locate(&AXIS, 38.45), Some(2));
    }

    #[test]
    fn test_tolerance_miss() {
        let policy = WithinTolerance::new(0.01);
        assert_eq!(policy.locate(&AXIS, 38.1), None);
    }
}
