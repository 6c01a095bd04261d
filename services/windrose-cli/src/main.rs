//! `windrose` command-line entry point.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use windrose_cli::{run_grid, run_point, CliConfig, Coordinate, PointOptions};

#[derive(Parser, Debug)]
#[command(name = "windrose")]
#[command(about = "Wind direction and speed from ERA5 U/V components")]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "WINDROSE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the yearly input files (overrides the config)
    #[arg(long, env = "ERA5_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Windrose tables for fixed grid points
    Point {
        /// Grid point as LAT,LON (repeatable)
        #[arg(long = "point", required = true, allow_hyphen_values = true)]
        points: Vec<Coordinate>,

        /// Input NetCDF file
        #[arg(long, conflicts_with = "year")]
        input: Option<PathBuf>,

        /// Year whose input file to read, via the file template
        #[arg(long)]
        year: Option<i32>,

        /// Accept the nearest axis value within this many degrees
        #[arg(long)]
        tolerance: Option<f64>,

        /// Directory for the JSON outputs (overrides the config)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Also write the decoded series of each point
        #[arg(long)]
        series: bool,
    },

    /// Export every grid cell at one timestamp
    Grid {
        /// Timestamp as D/MM/YYYY HH:MM:SS.ffffff
        #[arg(long)]
        timestamp: String,

        /// Input NetCDF file (default: chosen by the timestamp's year)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output text file (default: <output_dir>/file_wind_grid.txt)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Before any HDF5 call
    netcdf_parser::silence_hdf5_errors();

    let mut config = CliConfig::load_or_default(args.config.as_deref())?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    match args.command {
        Command::Point {
            points,
            input,
            year,
            tolerance,
            output_dir,
            series,
        } => {
            let input = match (input, year) {
                (Some(input), _) => input,
                (None, Some(year)) => config.input_for_year(year),
                (None, None) => bail!("either --input or --year is required"),
            };
            if let Some(tolerance) = tolerance {
                if tolerance.is_nan() || tolerance < 0.0 {
                    bail!("--tolerance must be non-negative");
                }
            }

            let options = PointOptions {
                points,
                input,
                tolerance,
                output_dir: output_dir.unwrap_or_else(|| config.output_dir.clone()),
                write_series: series,
            };
            info!(
                points = options.points.len(),
                input = %options.input.display(),
                "Computing windroses"
            );

            let written = run_point(&options, &config)?;
            info!(files = written.len(), "Point workflow complete");
        }
        Command::Grid {
            timestamp,
            input,
            output,
        } => {
            info!(timestamp = %timestamp, "Exporting grid snapshot");
            let path = run_grid(&timestamp, input.as_deref(), output.as_deref(), &config)?;
            info!(path = %path.display(), "Grid workflow complete");
        }
    }

    Ok(())
}
