//! Error types for resume-dl
//!
//! This module provides the error taxonomy for a single download attempt:
//! - Local file errors (open/write) are fatal to the attempt and propagate
//! - HTTP error statuses (>= 400, except 416) propagate with the status code
//! - Low-level network failures (DNS, reset, timeout) propagate as `Network`
//! - A malformed `Content-Length` header is never surfaced; the sink falls
//!   back to the transport-reported length and logs a warning
//!
//! Retry policy lives with the caller. [`Error::is_retryable`] classifies
//! errors as transient or permanent so the caller can build one.

use thiserror::Error;

/// Result type alias for resume-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for resume-dl
///
/// Each variant carries enough context to decide how an attempt failed.
/// HTTP 416 (Range Not Satisfiable) is deliberately absent: it is the benign
/// "already fully downloaded" signal and surfaces as
/// [`Outcome::AlreadyComplete`](crate::types::Outcome::AlreadyComplete),
/// not as an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "sample_interval")
        key: Option<String>,
    },

    /// The remote URL could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Local file could not be opened or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server answered with an error status (>= 400, != 416)
    #[error("HTTP error status {status}")]
    Http {
        /// The HTTP status code reported by the server
        status: u16,
    },

    /// Low-level network failure reported by the transport (DNS, connection
    /// reset, timeout), independent of any HTTP status
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl Error {
    /// Returns true if the error is transient and the caller may reasonably
    /// re-issue the attempt.
    ///
    /// Resumption makes retries cheap: a re-issued attempt only requests the
    /// bytes still missing. The library itself never retries; this
    /// classification exists for the caller who owns backoff policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            // Network errors are generally retryable
            Error::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            // I/O errors can be retryable in some cases
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            // Server-side and rate-limit statuses are worth another attempt;
            // client errors (404, 403, ...) are permanent
            Error::Http { status } => matches!(status, 408 | 429 | 500 | 502 | 503 | 504),
            // Config errors are permanent
            Error::Config { .. } => false,
            // A URL that does not parse will never parse
            Error::InvalidUrl(_) => false,
        }
    }
}
