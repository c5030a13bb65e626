//! Download attempt orchestration
//!
//! [`ResumableDownloader`] runs exactly one download attempt per call and
//! classifies its result. It never retries; the caller owns retry and
//! backoff policy ([`Error::is_retryable`](crate::Error::is_retryable)
//! exists to support that).
//!
//! One attempt: stat the local file, open the [`RangeDownloadSink`], send a
//! GET carrying `Range: bytes=N-`, stream the body into the sink, classify
//! the terminal status. The sink's cleanup runs on **every** exit path
//! before the outcome is returned, so the file handle is released
//! deterministically whether the attempt succeeds, fails, or is aborted.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::sink::{RangeDownloadSink, ResponseConsumer};
use crate::types::{DownloadHooks, Outcome};
use futures::StreamExt;
use reqwest::header;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// HTTP 416 Range Not Satisfiable: the benign "already fully downloaded"
/// signal for an open-ended range starting at end-of-file
const STATUS_RANGE_NOT_SATISFIABLE: u16 = 416;

/// Runs single resumable download attempts over a shared HTTP client
///
/// # Examples
///
/// ```no_run
/// use resume_dl::{Config, Outcome, ResumableDownloader};
///
/// # #[tokio::main]
/// # async fn main() -> resume_dl::Result<()> {
/// let downloader = ResumableDownloader::new(Config::default())?;
/// match downloader.download("https://example.com/big.iso", "big.iso").await? {
///     Outcome::Success => println!("downloaded"),
///     Outcome::AlreadyComplete => println!("nothing left to fetch"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct ResumableDownloader {
    client: reqwest::Client,
    config: Config,
}

impl ResumableDownloader {
    /// Build a downloader from `config`, validating it and constructing the
    /// shared HTTP client.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Run one download attempt without notification hooks.
    ///
    /// See [`download_with_hooks`](Self::download_with_hooks).
    pub async fn download(&self, url: &str, path: impl AsRef<Path>) -> Result<Outcome> {
        self.download_with_hooks(url, path, DownloadHooks::default())
            .await
    }

    /// Run one download attempt, resuming from whatever `path` already
    /// holds, and classify the result.
    ///
    /// Returns:
    /// - `Ok(Outcome::Success)` — the remaining range transferred in full
    /// - `Ok(Outcome::AlreadyComplete)` — server answered 416; the local
    ///   file already equals the remote file
    /// - `Err(Error::Http { .. })` — error status >= 400 (other than 416);
    ///   nothing was appended to the file
    /// - `Err(Error::Network(_))` — transport failure before or during the
    ///   body stream; bytes received so far remain on disk for the next
    ///   attempt to resume from
    /// - `Err(Error::Io(_))` — the local file could not be opened or written
    ///
    /// `hooks.on_start` fires once when the total size resolves;
    /// `hooks.on_progress` fires after every persisted chunk with the
    /// cumulative byte count (pre-existing bytes included).
    pub async fn download_with_hooks(
        &self,
        url: &str,
        path: impl AsRef<Path>,
        hooks: DownloadHooks,
    ) -> Result<Outcome> {
        let url = Url::parse(url)?;

        let mut sink = RangeDownloadSink::open(path)
            .await?
            .with_hooks(hooks)
            .with_sample_interval(self.config.sample_interval);

        let attempt = self.run_attempt(url, &mut sink).await;

        // Cleanup runs regardless of how the attempt ended. Its error must
        // not mask a real attempt failure.
        let released = sink.cleanup().await;
        let outcome = attempt?;
        released?;

        Ok(outcome)
    }

    async fn run_attempt(&self, url: Url, sink: &mut RangeDownloadSink) -> Result<Outcome> {
        let range = sink.range_header();
        debug!(%url, %range, resume_offset = sink.resume_offset(), "submitting request");

        let response = self
            .client
            .get(url.clone())
            .header(header::RANGE, range.as_str())
            .send()
            .await?;

        let status = response.status().as_u16();

        // 416 must be carved out before the generic >= 400 check: for an
        // open-ended range starting at end-of-file it means the file is
        // already fully present, not that anything went wrong.
        if status == STATUS_RANGE_NOT_SATISFIABLE {
            info!(%url, resume_offset = sink.resume_offset(), "already complete");
            return Ok(Outcome::AlreadyComplete);
        }
        if status >= 400 {
            return Err(Error::Http { status });
        }

        let content_length_header = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let reported_len = response.content_length().unwrap_or(0);
        sink.on_response(status, content_length_header.as_deref(), reported_len);

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if !sink.on_chunk(&chunk).await? {
                debug!(%url, "sink aborted the stream");
                break;
            }
        }

        sink.on_complete().await?;

        info!(
            %url,
            bytes = sink.current_size(),
            total = sink.total_size(),
            "attempt finished"
        );
        Ok(Outcome::Success)
    }
}
