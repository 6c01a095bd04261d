//! CDS retrieve client with polling, retry and streamed downloads.
//!
//! A retrieval is a three-step exchange with the archive:
//! 1. POST the request body to `/resources/{dataset}`; the reply carries a
//!    task state and a `request_id`
//! 2. GET `/tasks/{request_id}` until the state is `completed` (or `failed`),
//!    backing off exponentially between polls
//! 3. stream the file at the reply's `location` to a `.partial` file, then
//!    rename it into place

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use futures::StreamExt;
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use crate::config::CdsConfig;
use crate::request::{file_name, Era5Request, DATASET};

/// Configuration for the retrieve client.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Maximum number of retry attempts for submit and transfer
    pub max_retries: u32,
    /// Initial retry delay (doubles each retry)
    pub initial_retry_delay: Duration,
    /// Maximum retry delay
    pub max_retry_delay: Duration,
    /// First wait between task polls (doubles each poll)
    pub initial_poll_delay: Duration,
    /// Longest wait between task polls
    pub max_poll_delay: Duration,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Directory for completed downloads
    pub output_dir: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_retry_delay: Duration::from_secs(2),
            max_retry_delay: Duration::from_secs(120),
            initial_poll_delay: Duration::from_secs(1),
            max_poll_delay: Duration::from_secs(120),
            request_timeout: Duration::from_secs(3600), // large NetCDF transfers
            output_dir: PathBuf::from("."),
        }
    }
}

/// Double `delay`, capped at `max`.
pub fn next_delay(delay: Duration, max: Duration) -> Duration {
    std::cmp::min(delay * 2, max)
}

/// State of a queued retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Queued,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Task reply returned by both the submit and the poll endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskReply {
    pub state: TaskState,
    #[serde(default)]
    pub request_id: Option<String>,
    /// Result URL, present once completed
    #[serde(default)]
    pub location: Option<String>,
    /// Result size in bytes, present once completed
    #[serde(default)]
    pub content_length: Option<u64>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl TaskReply {
    fn request_id(&self) -> Result<&str> {
        self.request_id
            .as_deref()
            .ok_or_else(|| anyhow!("task reply has no request_id"))
    }
}

/// Outcome of retrieving one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    Downloaded { path: PathBuf, bytes: u64 },
    /// The output file already existed
    Skipped { path: PathBuf },
}

/// Retrieves yearly ERA5 wind files from the Climate Data Store.
pub struct CdsClient {
    client: Client,
    cds: CdsConfig,
    config: DownloadConfig,
}

impl CdsClient {
    pub fn new(cds: CdsConfig, config: DownloadConfig) -> Result<Self> {
        cds.credentials()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            cds,
            config,
        })
    }

    /// Path the file for `year` is written to.
    pub fn output_path(&self, year: i32) -> PathBuf {
        self.config.output_dir.join(file_name(year))
    }

    /// Retrieve one year, skipping it when the output file already exists.
    #[instrument(skip(self, request))]
    pub async fn retrieve_year(&self, year: i32, request: &Era5Request) -> Result<Retrieval> {
        let final_path = self.output_path(year);
        if final_path.exists() {
            info!(path = %final_path.display(), "File already exists, skipping download");
            return Ok(Retrieval::Skipped { path: final_path });
        }

        fs::create_dir_all(&self.config.output_dir).await?;

        let reply = self.with_retry("submit", || self.submit(request)).await?;
        info!(request_id = ?reply.request_id, state = ?reply.state, "Request accepted");

        let reply = self.wait_for_completion(reply).await?;
        let location = reply
            .location
            .as_deref()
            .ok_or_else(|| anyhow!("completed task has no location"))?;
        let url = self.resolve_location(location);

        let bytes = self
            .with_retry("download", || {
                self.download(&url, &final_path, reply.content_length)
            })
            .await?;

        info!(path = %final_path.display(), bytes = bytes, "Download completed");
        Ok(Retrieval::Downloaded {
            path: final_path,
            bytes,
        })
    }

    /// Submit a retrieve request.
    async fn submit(&self, request: &Era5Request) -> Result<TaskReply> {
        let url = format!("{}/resources/{}", self.cds.base_url(), DATASET);
        let (uid, key) = self.cds.credentials()?;

        let response = self
            .client
            .post(&url)
            .basic_auth(uid, Some(key))
            .json(request)
            .send()
            .await
            .context("Submit request failed")?;

        parse_reply(response).await
    }

    /// Fetch the current state of a task.
    async fn poll(&self, request_id: &str) -> Result<TaskReply> {
        let url = format!("{}/tasks/{}", self.cds.base_url(), request_id);
        let (uid, key) = self.cds.credentials()?;

        let response = self
            .client
            .get(&url)
            .basic_auth(uid, Some(key))
            .send()
            .await
            .context("Task poll failed")?;

        parse_reply(response).await
    }

    /// Poll until the task completes, backing off between polls.
    #[instrument(skip(self, reply), fields(request_id = ?reply.request_id))]
    async fn wait_for_completion(&self, mut reply: TaskReply) -> Result<TaskReply> {
        let mut delay = self.config.initial_poll_delay;

        loop {
            match reply.state {
                TaskState::Completed => return Ok(reply),
                TaskState::Failed => {
                    bail!(
                        "CDS task failed: {}",
                        reply
                            .error
                            .as_ref()
                            .map(|e| e.to_string())
                            .unwrap_or_else(|| "no reason given".to_string())
                    );
                }
                state => {
                    debug!(state = ?state, delay_secs = delay.as_secs(), "Task not ready");
                }
            }

            tokio::time::sleep(delay).await;
            delay = next_delay(delay, self.config.max_poll_delay);

            let request_id = reply.request_id()?.to_string();
            reply = self.with_retry("poll", || self.poll(&request_id)).await?;
        }
    }

    /// Stream `url` to `final_path` via a `.partial` file.
    async fn download(
        &self,
        url: &str,
        final_path: &Path,
        expected: Option<u64>,
    ) -> Result<u64> {
        let temp_path = partial_path(final_path);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("HTTP request failed")?;

        if response.status() != StatusCode::OK {
            bail!("HTTP error: {}", response.status());
        }

        let expected = expected.or_else(|| {
            response
                .headers()
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
        });

        let written = stream_to_file(response, &temp_path).await?;

        if let Some(expected) = expected {
            if written != expected {
                fs::remove_file(&temp_path).await.ok();
                bail!(
                    "Download size mismatch: expected {} bytes, got {}",
                    expected,
                    written
                );
            }
        }

        fs::rename(&temp_path, final_path)
            .await
            .context("Failed to move download into place")?;
        Ok(written)
    }

    /// Run `operation` until it succeeds or the retry budget is spent.
    async fn with_retry<T, F, Fut>(&self, what: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut retry_count = 0;
        let mut delay = self.config.initial_retry_delay;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    retry_count += 1;
                    if retry_count > self.config.max_retries {
                        return Err(e.context(format!(
                            "{} failed after {} retries",
                            what, self.config.max_retries
                        )));
                    }

                    warn!(
                        operation = what,
                        error = %e,
                        retry = retry_count,
                        max_retries = self.config.max_retries,
                        delay_secs = delay.as_secs(),
                        "Request failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    delay = next_delay(delay, self.config.max_retry_delay);
                }
            }
        }
    }

    fn resolve_location(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else {
            format!("{}/{}", self.cds.base_url(), location.trim_start_matches('/'))
        }
    }
}

/// `download_1960.nc` -> `download_1960.nc.partial`
fn partial_path(final_path: &Path) -> PathBuf {
    let mut name = final_path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

async fn parse_reply(response: Response) -> Result<TaskReply> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("HTTP error {}: {}", status, body);
    }
    response
        .json::<TaskReply>()
        .await
        .context("Malformed task reply")
}

/// Stream a response body to a fresh file, returning the byte count.
async fn stream_to_file(response: Response, path: &Path) -> Result<u64> {
    let mut file = File::create(path)
        .await
        .context("Failed to open output file")?;

    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    let mut next_report = 0u64;
    let report_interval = 50_000_000; // Log progress every 50MB

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Error reading response chunk")?;
        file.write_all(&chunk)
            .await
            .context("Error writing to file")?;

        written += chunk.len() as u64;
        if written >= next_report {
            debug!(downloaded = written, "Download progress");
            next_report = written + report_interval;
        }
    }

    // Flush and sync
    file.flush().await?;
    file.sync_all().await?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Area;

    fn client(output_dir: PathBuf) -> CdsClient {
        let cds = CdsConfig {
            url: "http://127.0.0.1:9/api/v2/".to_string(),
            key: "1:secret".to_string(),
        };
        CdsClient::new(
            cds,
            DownloadConfig {
                output_dir,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let max = Duration::from_secs(120);
        let mut delay = Duration::from_secs(2);
        let mut seen = Vec::new();
        for _ in 0..8 {
            seen.push(delay.as_secs());
            delay = next_delay(delay, max);
        }
        assert_eq!(seen, vec![2, 4, 8, 16, 32, 64, 120, 120]);
    }

    #[test]
    fn test_parse_task_states() {
        let reply: TaskReply =
            serde_json::from_str(r#"{"state": "queued", "request_id": "abc-123"}"#).unwrap();
        assert_eq!(reply.state, TaskState::Queued);
        assert_eq!(reply.request_id().unwrap(), "abc-123");
        assert!(reply.location.is_none());

        let reply: TaskReply = serde_json::from_str(
            r#"{"state": "completed", "request_id": "abc-123",
                "location": "https://download.example/abc.nc", "content_length": 1024}"#,
        )
        .unwrap();
        assert_eq!(reply.state, TaskState::Completed);
        assert_eq!(reply.content_length, Some(1024));

        let reply: TaskReply = serde_json::from_str(r#"{"state": "dismissed"}"#).unwrap();
        assert_eq!(reply.state, TaskState::Unknown);
        assert!(reply.request_id().is_err());
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/data/download_1960.nc")),
            PathBuf::from("/data/download_1960.nc.partial")
        );
    }

    #[test]
    fn test_resolve_location() {
        let client = client(PathBuf::from("."));
        assert_eq!(
            client.resolve_location("https://download.example/x.nc"),
            "https://download.example/x.nc"
        );
        assert_eq!(
            client.resolve_location("/cache/x.nc"),
            "http://127.0.0.1:9/api/v2/cache/x.nc"
        );
    }

    #[test]
    fn test_rejects_malformed_key() {
        let cds = CdsConfig {
            url: "http://localhost".to_string(),
            key: "secret".to_string(),
        };
        assert!(CdsClient::new(cds, DownloadConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_existing_year_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(dir.path().to_path_buf());
        let existing = dir.path().join("download_1960.nc");
        std::fs::write(&existing, b"already here").unwrap();

        let request = Era5Request::for_year(1960, Area::default());
        let outcome = client.retrieve_year(1960, &request).await.unwrap();

        assert_eq!(outcome, Retrieval::Skipped { path: existing });
    }
}
