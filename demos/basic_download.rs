//! Basic download example
//!
//! This example demonstrates the core functionality of resume-dl:
//! - Building a downloader from a configuration
//! - Running one attempt with start/progress hooks
//! - Interpreting the outcome classification
//! - Re-running the same attempt to resume an interrupted download
//!
//! Usage: cargo run --example basic_download -- <url> <local-file>

use resume_dl::{Config, DownloadHooks, Outcome, ResumableDownloader};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| {
        "https://proof.ovh.net/files/10Mb.dat".to_string()
    });
    let dest = args.next().unwrap_or_else(|| "10Mb.dat".to_string());

    let config = Config {
        connect_timeout: Duration::from_secs(15),
        ..Default::default()
    };
    let downloader = ResumableDownloader::new(config)?;

    let hooks = DownloadHooks {
        on_start: Some(Box::new(|total| {
            println!("⬇ total size: {:.2} MB", total as f64 / 1_048_576.0);
        })),
        on_progress: Some(Box::new(|bytes| {
            print!("\r  {:.2} MB on disk", bytes as f64 / 1_048_576.0);
        })),
    };

    println!("downloading {url} -> {dest}");
    match downloader.download_with_hooks(&url, &dest, hooks).await {
        Ok(Outcome::Success) => println!("\n✓ download complete"),
        Ok(Outcome::AlreadyComplete) => println!("\n✓ file was already complete"),
        Err(e) if e.is_retryable() => {
            // The partial file stays on disk; running this example again
            // resumes from where it stopped.
            println!("\n✗ transient failure, run again to resume: {e}");
        }
        Err(e) => println!("\n✗ failed: {e}"),
    }

    Ok(())
}
