//! Path utilities for locating ERA5 test data files.
//!
//! Real ERA5 downloads are large and need CDS credentials, so they are never
//! committed. Tests that want one look for it in a few well-known places and
//! skip themselves when it is absent.

use std::path::PathBuf;

/// Returns the workspace root directory (two levels above this crate).
fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns `crates/{crate_name}/testdata/`.
fn crate_testdata_dir(crate_name: &str) -> PathBuf {
    workspace_root()
        .join("crates")
        .join(crate_name)
        .join("testdata")
}

/// Searches for a test file in multiple locations.
///
/// Checked in order:
/// 1. `TEST_DATA_DIR` (if set)
/// 2. `crates/netcdf-parser/testdata/`
/// 3. `testdata/` at the workspace root
/// 4. the downloader's default output directory, `data/`
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([
        crate_testdata_dir("netcdf-parser").join(name),
        root.join("testdata").join(name),
        root.join("data").join(name),
    ]);

    candidates.into_iter().find(|path| path.exists())
}

/// Creates a temporary directory for test output, removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}
