//! Core types for resume-dl

use serde::{Deserialize, Serialize};

/// How a completed (non-failed) download attempt ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The remaining byte range was transferred in full
    Success,
    /// The server answered 416 Range Not Satisfiable to our open-ended
    /// range request: the local file already holds the whole remote file.
    /// Benign; callers should treat it like success.
    AlreadyComplete,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::AlreadyComplete => write!(f, "already complete"),
        }
    }
}

/// Point-in-time snapshot of one attempt's transfer state
///
/// Produced by [`RangeDownloadSink::snapshot`](crate::sink::RangeDownloadSink::snapshot).
/// Serializable so consumers can forward it to a UI or persist a progress
/// checkpoint; the local file itself remains the only durable resume state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferProgress {
    /// Bytes already on disk when this attempt started
    pub resume_offset: u64,
    /// Cumulative bytes on disk now, including `resume_offset`
    pub current_bytes: u64,
    /// Full remote file size; 0 until the response headers resolve it
    pub total_bytes: u64,
    /// Completed fraction in [0, 1]; 0.0 while `total_bytes` is unknown
    pub fraction: f64,
    /// Last sampled throughput in KB/s, truncated to two decimals
    pub speed_kbps: f64,
}

impl TransferProgress {
    /// Bytes still to be fetched, or 0 while the total is unknown
    pub fn remaining(&self) -> u64 {
        self.total_bytes.saturating_sub(self.current_bytes)
    }
}

/// Hook invoked once when the total file size has been resolved from the
/// response headers; receives the full size in bytes.
pub type StartHook = Box<dyn FnMut(u64) + Send>;

/// Hook invoked after every successful chunk write; receives the cumulative
/// byte count on disk (including bytes present before the attempt).
pub type ProgressHook = Box<dyn FnMut(u64) + Send>;

/// Caller-supplied notification hooks for one download attempt
///
/// There is one producer (the sink) and typically one consumer per attempt,
/// so hooks are plain closures handed into the attempt rather than an event
/// bus.
#[derive(Default)]
pub struct DownloadHooks {
    /// Fired once the total file size is known
    pub on_start: Option<StartHook>,
    /// Fired with the cumulative size after each persisted chunk
    pub on_progress: Option<ProgressHook>,
}

impl DownloadHooks {
    /// Hooks that only observe progress updates
    pub fn on_progress(f: impl FnMut(u64) + Send + 'static) -> Self {
        Self {
            on_start: None,
            on_progress: Some(Box::new(f)),
        }
    }
}

impl std::fmt::Debug for DownloadHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadHooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}
