//! Climate Data Store credentials.
//!
//! Resolved from `CDSAPI_URL`/`CDSAPI_KEY` when both are set, otherwise from
//! the `~/.cdsapirc` file shared with the official Python client:
//!
//! ```text
//! url: https://cds.climate.copernicus.eu/api/v2
//! key: 12345:00000000-0000-0000-0000-000000000000
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_CDS_URL: &str = "https://cds.climate.copernicus.eu/api/v2";

/// API endpoint and `uid:key` credential.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CdsConfig {
    #[serde(default = "default_url")]
    pub url: String,
    pub key: String,
}

fn default_url() -> String {
    DEFAULT_CDS_URL.to_string()
}

impl CdsConfig {
    /// Parse the contents of a `.cdsapirc` file.
    pub fn parse_rc(content: &str) -> Result<Self> {
        let config: CdsConfig =
            serde_yaml::from_str(content).context("Failed to parse CDS credentials")?;
        config.credentials()?;
        Ok(config)
    }

    /// Load a `.cdsapirc` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse_rc(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), url = %config.url, "Loaded CDS credentials");
        Ok(config)
    }

    /// Resolve credentials from explicit values, falling back to `rc_path`
    /// or `~/.cdsapirc`.
    pub fn resolve(
        url: Option<String>,
        key: Option<String>,
        rc_path: Option<&Path>,
    ) -> Result<Self> {
        if let Some(key) = key {
            let config = Self {
                url: url.unwrap_or_else(default_url),
                key,
            };
            config.credentials()?;
            return Ok(config);
        }

        let path = match rc_path {
            Some(path) => path.to_path_buf(),
            None => default_rc_path()
                .ok_or_else(|| anyhow!("CDSAPI_KEY not set and no home directory for .cdsapirc"))?,
        };
        let mut config = Self::load(&path)?;
        if let Some(url) = url {
            config.url = url;
        }
        Ok(config)
    }

    /// Split the key into the (user id, API key) pair used for basic auth.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        self.key
            .split_once(':')
            .filter(|(uid, key)| !uid.is_empty() && !key.is_empty())
            .ok_or_else(|| anyhow!("CDS key must have the form <uid>:<api-key>"))
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

fn default_rc_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cdsapirc"))
}
