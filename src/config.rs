//! Configuration types for resume-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Download attempt configuration (transport tuning, throughput sampling)
///
/// All fields have sensible defaults; `Config::default()` works out of the
/// box. The config is applied once when the [`ResumableDownloader`]
/// (crate::ResumableDownloader) is constructed and shared by every attempt
/// issued through it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Timeout for establishing the TCP/TLS connection (default: 30s)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Optional whole-request timeout (default: None)
    ///
    /// Left unset by default: a large transfer on a slow link can
    /// legitimately run for hours, and killing it with a global deadline
    /// would defeat the point of resumption. Set it when downloading small
    /// files from untrusted servers.
    #[serde(default)]
    pub request_timeout: Option<Duration>,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum interval between throughput samples (default: 1s)
    ///
    /// Speed is recomputed from the byte delta once at least this much time
    /// has passed since the previous sample.
    #[serde(default = "default_sample_interval")]
    pub sample_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: None,
            user_agent: default_user_agent(),
            sample_interval: default_sample_interval(),
        }
    }
}

impl Config {
    /// Validate the configuration, returning a [`Error::Config`] naming the
    /// offending key on failure.
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(Error::Config {
                message: "connect timeout must be non-zero".to_string(),
                key: Some("connect_timeout".to_string()),
            });
        }
        if self.sample_interval.is_zero() {
            return Err(Error::Config {
                message: "throughput sample interval must be non-zero".to_string(),
                key: Some("sample_interval".to_string()),
            });
        }
        if self.user_agent.is_empty() {
            return Err(Error::Config {
                message: "user agent must not be empty".to_string(),
                key: Some("user_agent".to_string()),
            });
        }
        Ok(())
    }
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("resume-dl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_sample_interval() -> Duration {
    Duration::from_secs(1)
}
