//! ERA5 wind data downloader.
//!
//! Retrieves one NetCDF file per year of hourly 10 m U/V wind components from
//! the Copernicus Climate Data Store:
//! - Yearly requests over a configurable area
//! - Task polling with exponential backoff
//! - Automatic retry of failed submits and transfers
//! - Years already on disk are skipped

mod config;
mod download;
mod request;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use config::CdsConfig;
use download::{CdsClient, DownloadConfig, Retrieval};
use request::{Area, Era5Request};

#[derive(Parser, Debug)]
#[command(name = "era5-downloader")]
#[command(about = "Download ERA5 10m wind components from the Climate Data Store")]
struct Args {
    /// Years to retrieve (repeatable)
    #[arg(long, required = true, num_args = 1..)]
    years: Vec<i32>,

    /// Area as north,west,south,east
    #[arg(long, default_value_t = Area::default(), allow_hyphen_values = true)]
    area: Area,

    /// Directory for completed downloads
    #[arg(long, env = "OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Maximum retry attempts
    #[arg(long, default_value = "5")]
    max_retries: u32,

    /// CDS API URL (overrides .cdsapirc)
    #[arg(long, env = "CDSAPI_URL")]
    cds_url: Option<String>,

    /// CDS API key as <uid>:<api-key> (overrides .cdsapirc)
    #[arg(long, env = "CDSAPI_KEY", hide_env_values = true)]
    cds_key: Option<String>,

    /// Credentials file (default ~/.cdsapirc)
    #[arg(long, env = "CDSAPI_RC")]
    cdsapirc: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
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

    info!(years = ?args.years, area = %args.area, "Starting ERA5 downloader");

    let cds = CdsConfig::resolve(
        args.cds_url.clone(),
        args.cds_key.clone(),
        args.cdsapirc.as_deref(),
    )?;

    let download_config = DownloadConfig {
        max_retries: args.max_retries,
        initial_retry_delay: Duration::from_secs(2),
        max_retry_delay: Duration::from_secs(120),
        output_dir: args.output_dir.clone(),
        ..Default::default()
    };
    let client = CdsClient::new(cds, download_config)?;

    let mut downloaded = 0;
    let mut skipped = 0;
    let mut failed = Vec::new();

    // The CDS queues requests per user, so years are retrieved one at a time
    for &year in &args.years {
        let request = Era5Request::for_year(year, args.area);
        match client.retrieve_year(year, &request).await {
            Ok(Retrieval::Downloaded { .. }) => downloaded += 1,
            Ok(Retrieval::Skipped { .. }) => skipped += 1,
            Err(e) => {
                error!(year = year, error = %format!("{:#}", e), "Retrieval failed");
                failed.push(year);
            }
        }
    }

    info!(
        downloaded = downloaded,
        skipped = skipped,
        failed = failed.len(),
        "Download session complete"
    );

    if !failed.is_empty() {
        bail!("retrieval failed for years {:?}", failed);
    }
    Ok(())
}
