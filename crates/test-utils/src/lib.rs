//! Helpers shared by the workspace's tests.
//!
//! Synthetic wind cubes live in [`generators`], hand-checked values in
//! [`fixtures`]. Real ERA5 downloads are optional: [`require_test_file!`]
//! skips a test when the file cannot be found (see [`find_test_file`]).

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve a test data file or return early from the calling test.
///
/// ```ignore
/// let path = require_test_file!("download_1960.nc");
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("skipping: {} not found (set TEST_DATA_DIR)", $name);
                return;
            }
        }
    }};
}

/// Assert `|left - right| <= epsilon`, comparing as `f64`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left = $left as f64;
        let right = $right as f64;
        let epsilon = $epsilon as f64;
        let diff = (left - right).abs();
        assert!(
            diff <= epsilon,
            "assertion failed: {} != {} within {} (diff {})",
            left,
            right,
            epsilon,
            diff
        );
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_eq_within_epsilon() {
        assert_approx_eq!(38.7501, 38.75, 0.001);
        assert_approx_eq!(-9.5, -9.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_approx_eq_outside_epsilon() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }
}
