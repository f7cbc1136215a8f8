use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use url::Url;

use super::list::{parse_list_line, ImageList, ListEntry};
use super::naming::{image_file_name, sanitize_sku, unique_path};

/// Largest image body accepted (50MB).
pub const MAX_IMAGE_SIZE: usize = 50 * 1024 * 1024;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

/// Progress is reported every this many list lines.
pub const PROGRESS_EVERY: usize = 50;

/// Errors for a single image list entry. None of them stop the batch.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The list line does not split into exactly `sku|url`.
    #[error("Invalid list line: {0}")]
    MalformedListLine(String),
    /// The URL could not be parsed or is not http(s).
    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Counters reported at the end of a download run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    /// Non-blank list lines processed.
    pub total: usize,
    pub succeeded: usize,
    /// Blank lines ignored.
    pub skipped: usize,
    /// Malformed lines plus failed downloads.
    pub errored: usize,
}

/// Notifications emitted while [`Downloader::run`] works through a list.
#[derive(Debug)]
pub enum DownloadEvent<'a> {
    /// Emitted every [`PROGRESS_EVERY`] lines.
    Progress {
        done: usize,
        total: usize,
        stats: DownloadStats,
    },
    /// A line is not `sku|url`. No request was made.
    Malformed {
        line: &'a str,
        error: &'a DownloadError,
    },
    /// A download failed. `failures` counts failed downloads so far,
    /// including this one; malformed lines are not counted.
    Failed {
        line: &'a str,
        error: &'a DownloadError,
        failures: usize,
    },
    Saved {
        sku: &'a str,
        path: &'a Path,
    },
}

/// Sequential image fetcher writing into `<dest>/<sku>/<file>`.
pub struct Downloader {
    client: reqwest::Client,
    dest: PathBuf,
    timeout: Duration,
    delay: Duration,
    max_size: usize,
}

impl Downloader {
    pub fn new(client: reqwest::Client, dest: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dest: dest.into(),
            timeout: DEFAULT_TIMEOUT,
            delay: DEFAULT_DELAY,
            max_size: MAX_IMAGE_SIZE,
        }
    }

    /// Per-request timeout covering the whole response body.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pause after each line, so the image host is not hammered.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Largest body accepted, [`MAX_IMAGE_SIZE`] unless overridden.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Downloads one image and returns where it was saved.
    ///
    /// Never overwrites: an existing file name gets a `_<n>` suffix. A partial
    /// file is removed when the transfer fails.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::InvalidUrl`] - URL unparsable or not http(s)
    /// - [`DownloadError::Timeout`] - no complete response within the timeout
    /// - [`DownloadError::HttpStatus`] - non-2xx response
    /// - [`DownloadError::ResponseTooLarge`] - body over the size cap
    /// - [`DownloadError::Network`] / [`DownloadError::Io`]
    pub async fn download(&self, entry: &ListEntry) -> Result<PathBuf, DownloadError> {
        let url = Url::parse(&entry.url)
            .map_err(|e| DownloadError::InvalidUrl(format!("{}: {}", entry.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DownloadError::InvalidUrl(entry.url.clone()));
        }

        let sku_dir = self.dest.join(sanitize_sku(&entry.sku));
        tokio::fs::create_dir_all(&sku_dir).await?;
        let path = unique_path(&sku_dir, &image_file_name(&url, &entry.sku));

        let mut created = false;
        let result =
            match tokio::time::timeout(self.timeout, self.fetch_to_file(url, &path, &mut created))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(DownloadError::Timeout(self.timeout)),
            };

        if let Err(e) = result {
            if created {
                remove_partial(&path).await;
            }
            return Err(e);
        }
        Ok(path)
    }

    async fn fetch_to_file(
        &self,
        url: Url,
        path: &Path,
        created: &mut bool,
    ) -> Result<(), DownloadError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DownloadError::HttpStatus(response.status().as_u16()));
        }
        if let Some(len) = response.content_length() {
            if len > self.max_size as u64 {
                return Err(DownloadError::ResponseTooLarge(self.max_size));
            }
        }

        // create_new: a file that appeared since `unique_path` is never clobbered
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        *created = true;

        let mut written: usize = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written = written.saturating_add(chunk.len());
            if written > self.max_size {
                return Err(DownloadError::ResponseTooLarge(self.max_size));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!(path = %path.display(), bytes = written, "Saved image");
        Ok(())
    }

    /// Works through every line of the list, one request at a time.
    ///
    /// Malformed lines and failed downloads are counted and reported through
    /// `on_event`; they never abort the run.
    pub async fn run<F>(&self, list: &ImageList, mut on_event: F) -> DownloadStats
    where
        F: FnMut(DownloadEvent<'_>),
    {
        let total = list.lines.len();
        let mut stats = DownloadStats {
            skipped: list.blank_lines,
            ..DownloadStats::default()
        };
        let mut failures = 0;

        for (i, line) in list.lines.iter().enumerate() {
            let done = i + 1;
            stats.total = done;

            match parse_list_line(line) {
                Err(error) => {
                    stats.errored += 1;
                    tracing::warn!(line = %line, "Skipping malformed list line");
                    on_event(DownloadEvent::Malformed {
                        line,
                        error: &error,
                    });
                }
                Ok(entry) => {
                    let result = self.download(&entry).await;
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }

                    match result {
                        Ok(path) => {
                            stats.succeeded += 1;
                            on_event(DownloadEvent::Saved {
                                sku: &entry.sku,
                                path: &path,
                            });
                        }
                        Err(error) => {
                            stats.errored += 1;
                            failures += 1;
                            tracing::warn!(line = %line, error = %error, "Image download failed");
                            on_event(DownloadEvent::Failed {
                                line,
                                error: &error,
                                failures,
                            });
                        }
                    }
                }
            }

            if done % PROGRESS_EVERY == 0 {
                on_event(DownloadEvent::Progress { done, total, stats });
            }
        }

        tracing::info!(
            total = stats.total,
            succeeded = stats.succeeded,
            skipped = stats.skipped,
            errored = stats.errored,
            "Image download finished"
        );
        stats
    }
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial image");
        }
    }
}
