//! Common test fixtures for wind decoding tests.

/// Hand-checked (u, v) → "blows toward" heading cases.
pub mod headings {
    /// (u, v, expected direction in degrees)
    pub const CARDINAL: [(f64, f64, f64); 4] = [
        (0.0, 5.0, 0.0),
        (5.0, 0.0, 90.0),
        (0.0, -5.0, 180.0),
        (-5.0, 0.0, 270.0),
    ];

    /// (u, v, expected direction in degrees)
    pub const DIAGONAL: [(f64, f64, f64); 4] = [
        (1.0, 1.0, 45.0),
        (1.0, -1.0, 135.0),
        (-1.0, -1.0, 225.0),
        (-1.0, 1.0, 315.0),
    ];
}

/// Values from the classic ERA5 single-levels request used by the tools.
pub mod era5 {
    /// Native grid spacing in degrees
    pub const STEP: f64 = 0.25;

    /// Hours since 1900-01-01 at 1960-01-01 00:00
    pub const HOURS_1960: i64 = 525_936;

    /// The example export timestamp and its hour count
    pub const EXAMPLE_TIMESTAMP: &str = "1/01/1960 02:00:00.000000";
    pub const EXAMPLE_HOURS: i64 = HOURS_1960 + 2;

    /// The example windrose point (off Cabo da Roca)
    pub const POINT: (f64, f64) = (38.75, -9.5);
}
