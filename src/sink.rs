//! Streaming range-download sink
//!
//! [`RangeDownloadSink`] is the consumer half of one download attempt: it
//! owns the local output file, appends every received chunk, and tracks
//! progress and throughput. It is bound to a single in-flight request; the
//! orchestrator in [`crate::downloader`] drives it through the
//! [`ResponseConsumer`] lifecycle and always releases it via
//! [`RangeDownloadSink::cleanup`] on every exit path.
//!
//! The local file is the only durable resume state: the sink stats it on
//! open and derives the `Range: bytes=N-` request header from its size.

use crate::error::Result;
use crate::types::{DownloadHooks, TransferProgress};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Default minimum interval between throughput samples
const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Lifecycle hooks invoked by the transport layer while a response streams in
///
/// One concrete implementation exists ([`RangeDownloadSink`]); the trait
/// marks the seam between transport and consumer so tests can drive the full
/// lifecycle without a real HTTP exchange.
#[async_trait]
pub trait ResponseConsumer {
    /// Called once when the response headers are available.
    ///
    /// `content_length_header` is the raw `Content-Length` header value, if
    /// present; `reported_len` is the length the transport derived itself.
    fn on_response(&mut self, status: u16, content_length_header: Option<&str>, reported_len: u64);

    /// Called for every received body chunk.
    ///
    /// Returns `Ok(false)` to signal the transport to stop delivering data
    /// (empty chunk, or an error status response whose body is garbage).
    async fn on_chunk(&mut self, chunk: &[u8]) -> Result<bool>;

    /// Called once after the full response body has been consumed.
    async fn on_complete(&mut self) -> Result<()>;

    /// Full response body, for consumers that buffer it. Always `None` here:
    /// bytes go straight to disk.
    fn payload(&self) -> Option<&[u8]>;

    /// Response body as text. Always `None` here.
    fn text(&self) -> Option<String>;
}

/// Streaming response consumer that appends to a local file and resumes
/// from whatever is already on disk
///
/// # Lifecycle
///
/// 1. [`open`](Self::open) stats the target path and opens it append-only;
///    the pre-existing size becomes the resume offset.
/// 2. The orchestrator applies [`range_header`](Self::range_header) to the
///    outbound request and submits it.
/// 3. [`on_response`](ResponseConsumer::on_response) resolves the total
///    file size; [`on_chunk`](ResponseConsumer::on_chunk) persists bytes.
/// 4. [`cleanup`](Self::cleanup) flushes and closes the file. It is
///    idempotent and is called on every exit path, success or failure.
pub struct RangeDownloadSink {
    path: PathBuf,
    /// Open append handle; `None` once cleanup has released it
    file: Option<tokio::fs::File>,
    resume_offset: u64,
    total_size: u64,
    current_size: u64,
    /// HTTP status of the response being consumed, once known
    status: Option<u16>,
    sample_interval: Duration,
    last_sample_at: Instant,
    last_sample_size: u64,
    speed_bps: f64,
    hooks: DownloadHooks,
}

impl RangeDownloadSink {
    /// Open a sink for `path`, resuming from the bytes already present.
    ///
    /// Creates the file if it does not exist. Fails with
    /// [`Error::Io`](crate::Error::Io) if the file cannot be opened for
    /// appending.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let resume_offset = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };

        // Append mode preserves existing bytes and positions every write at
        // end-of-file, so a resumed attempt continues exactly where the
        // previous one stopped.
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .await?;

        debug!(path = %path.display(), resume_offset, "opened range download sink");

        Ok(Self {
            path,
            file: Some(file),
            resume_offset,
            total_size: 0,
            current_size: resume_offset,
            status: None,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            last_sample_at: Instant::now(),
            last_sample_size: resume_offset,
            speed_bps: 0.0,
            hooks: DownloadHooks::default(),
        })
    }

    /// Attach caller-supplied start/progress hooks
    pub fn with_hooks(mut self, hooks: DownloadHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Override the minimum interval between throughput samples
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    /// Value for the outbound `Range` request header: `bytes={offset}-`,
    /// the open-ended range asking for everything from the resume offset to
    /// the end of the file.
    pub fn range_header(&self) -> String {
        format!("bytes={}-", self.resume_offset)
    }

    /// Bytes already on disk when this attempt started
    pub fn resume_offset(&self) -> u64 {
        self.resume_offset
    }

    /// Cumulative bytes on disk, including those present before the attempt
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Full remote file size, or 0 while the response has not resolved it
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Bytes still to fetch, or 0 while the total is unknown
    pub fn remaining(&self) -> u64 {
        self.total_size.saturating_sub(self.current_size)
    }

    /// Completed fraction in [0, 1]; 0.0 exactly while the total is unknown
    pub fn progress(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            self.current_size as f64 / self.total_size as f64
        }
    }

    /// Last sampled throughput in KB/s, truncated to two decimal places
    pub fn speed_kbps(&self) -> f64 {
        truncated_kbps(self.speed_bps)
    }

    /// Point-in-time snapshot of the transfer state
    pub fn snapshot(&self) -> TransferProgress {
        TransferProgress {
            resume_offset: self.resume_offset,
            current_bytes: self.current_size,
            total_bytes: self.total_size,
            fraction: self.progress(),
            speed_kbps: self.speed_kbps(),
        }
    }

    /// Release the file handle: reset speed, flush buffered writes to
    /// stable storage, close the file.
    ///
    /// Idempotent: the first call releases the handle, every later call is
    /// a no-op. Safe to invoke from the completion path, from the
    /// orchestrator's error paths, and redundantly from the caller, in any
    /// order.
    pub async fn cleanup(&mut self) -> Result<()> {
        self.speed_bps = 0.0;
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
            debug!(path = %self.path.display(), bytes = self.current_size, "sink closed");
        }
        Ok(())
    }

    /// True once cleanup has released the file handle
    pub fn is_released(&self) -> bool {
        self.file.is_none()
    }
}

#[async_trait]
impl ResponseConsumer for RangeDownloadSink {
    fn on_response(&mut self, status: u16, content_length_header: Option<&str>, reported_len: u64) {
        self.status = Some(status);

        // Prefer the raw Content-Length header: it is a full u64, while a
        // transport-derived length may have been narrowed or adjusted (e.g.
        // by decompression) and is unreliable for files past 2 GiB.
        let remaining = match content_length_header {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(len) => len,
                Err(e) => {
                    warn!(
                        raw,
                        error = %e,
                        fallback = reported_len,
                        "malformed Content-Length header, using transport-reported length"
                    );
                    reported_len
                }
            },
            None => reported_len,
        };

        // The server only reports the length of the remaining range; the
        // full size includes what was already on disk.
        self.total_size = self.resume_offset + remaining;
        self.last_sample_at = Instant::now();
        self.last_sample_size = self.current_size;

        debug!(
            status,
            remaining,
            total = self.total_size,
            "download started"
        );

        if let Some(on_start) = &mut self.hooks.on_start {
            on_start(self.total_size);
        }
    }

    async fn on_chunk(&mut self, chunk: &[u8]) -> Result<bool> {
        // Stop consuming on empty input or when the response itself is an
        // error: an error body is not file content.
        if chunk.is_empty() || self.status.is_some_and(|s| s >= 400) {
            debug!(
                len = chunk.len(),
                status = ?self.status,
                "rejecting chunk"
            );
            return Ok(false);
        }

        let Some(file) = self.file.as_mut() else {
            // Handle already released (cleanup ran mid-stream); tell the
            // transport to stop.
            return Ok(false);
        };

        file.write_all(chunk).await?;
        self.current_size += chunk.len() as u64;

        let elapsed = self.last_sample_at.elapsed();
        if elapsed >= self.sample_interval {
            self.speed_bps =
                (self.current_size - self.last_sample_size) as f64 / elapsed.as_secs_f64();
            self.last_sample_at = Instant::now();
            self.last_sample_size = self.current_size;
        }

        if let Some(on_progress) = &mut self.hooks.on_progress {
            on_progress(self.current_size);
        }

        Ok(true)
    }

    async fn on_complete(&mut self) -> Result<()> {
        self.cleanup().await
    }

    fn payload(&self) -> Option<&[u8]> {
        None
    }

    fn text(&self) -> Option<String> {
        None
    }
}

impl Drop for RangeDownloadSink {
    fn drop(&mut self) {
        // The handle itself closes with the inner File; only the
        // flush-to-stable-storage step is lost on this path.
        if self.file.is_some() {
            warn!(
                path = %self.path.display(),
                "sink dropped without explicit cleanup; buffered writes may not be durable"
            );
        }
    }
}

/// Bytes-per-second to KB/s, truncated (not rounded) to two decimals
fn truncated_kbps(bytes_per_sec: f64) -> f64 {
    ((bytes_per_sec / 1024.0 * 100.0) as u64) as f64 / 100.0
}
