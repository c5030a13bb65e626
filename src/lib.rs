//! # resume-dl
//!
//! Resumable HTTP(S) file download library.
//!
//! ## Design Philosophy
//!
//! resume-dl is designed to be:
//! - **Resumable by construction** - the local file is the checkpoint; a
//!   re-issued attempt requests only the missing byte range
//! - **Single-attempt** - each call runs exactly one attempt and classifies
//!   it; retry and backoff policy stay with the caller
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding
//! - **Deterministic about resources** - the output file handle is released
//!   on every exit path, never left to garbage collection
//!
//! ## Quick Start
//!
//! ```no_run
//! use resume_dl::{Config, DownloadHooks, Outcome, ResumableDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = ResumableDownloader::new(Config::default())?;
//!
//!     let hooks = DownloadHooks::on_progress(|bytes| {
//!         println!("{bytes} bytes on disk");
//!     });
//!
//!     match downloader
//!         .download_with_hooks("https://example.com/big.iso", "big.iso", hooks)
//!         .await?
//!     {
//!         Outcome::Success => println!("downloaded"),
//!         Outcome::AlreadyComplete => println!("file was already complete"),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! If an attempt is interrupted, the partial file stays at the target path
//! and the next `download` call resumes from its size. Callers wanting
//! atomic completion should download to a staging name and rename on
//! success.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Attempt orchestration
pub mod downloader;
/// Error types
pub mod error;
/// Streaming range-download sink
pub mod sink;
/// Core types and notification hooks
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use downloader::ResumableDownloader;
pub use error::{Error, Result};
pub use sink::{RangeDownloadSink, ResponseConsumer};
pub use types::{DownloadHooks, Outcome, ProgressHook, StartHook, TransferProgress};
