//! Delimited-text export of grid snapshots.
//!
//! The layout is fixed for compatibility with existing consumers: a
//! comma-separated header line followed by semicolon-separated rows of
//! `lat;lon;direction;speed_ms;speed_kt`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;
use wind_common::WindResult;

use crate::extract::{GridRow, GridSnapshot};

pub const GRID_HEADER: &str = "Latitude,Longitude,direction,intensity,intensityKts";

/// Format one snapshot row (without trailing newline).
pub fn format_row(row: &GridRow) -> String {
    format!(
        "{};{};{};{};{}",
        row.latitude,
        row.longitude,
        row.reading.direction,
        row.reading.speed_ms,
        row.reading.speed_kt
    )
}

/// Write the header and every row of `snapshot` to `writer`.
pub fn write_grid_snapshot<W: Write>(snapshot: &GridSnapshot, mut writer: W) -> WindResult<()> {
    writeln!(writer, "{}", GRID_HEADER)?;
    for row in &snapshot.rows {
        writeln!(writer, "{}", format_row(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `snapshot` to a new file at `path`, replacing any existing file.
pub fn export_grid_snapshot(snapshot: &GridSnapshot, path: &Path) -> WindResult<()> {
    let file = File::create(path)?;
    write_grid_snapshot(snapshot, BufWriter::new(file))?;

    info!(
        path = %path.display(),
        rows = snapshot.len(),
        time = snapshot.time,
        "Exported grid snapshot"
    );
    Ok(())
}
