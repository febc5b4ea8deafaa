//! Runtime configuration.
//!
//! Deadlines and retry bounds are the knobs that make the blocking core
//! testable: production keeps the defaults, tests shrink them to
//! milliseconds.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Bounded retry applied uniformly at the element-access layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 7,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Entry points into the trading platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseUrls {
    pub login: Url,
    pub demo: Url,
    pub live: Url,
}

impl Default for BaseUrls {
    fn default() -> Self {
        Self {
            login: Url::parse("https://www.trading212.com/en/login").unwrap(),
            demo: Url::parse("https://demo.trading212.com/").unwrap(),
            live: Url::parse("https://live.trading212.com/").unwrap(),
        }
    }
}

/// Crate configuration, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub urls: BaseUrls,
    /// Directory holding the per-mode instrument cache files.
    pub cache_dir: PathBuf,
    /// How long to poll for an element to appear.
    pub element_timeout: Duration,
    /// How long to poll for the post-login marker.
    pub login_timeout: Duration,
    /// Interval between polls of a wait predicate.
    pub poll_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            urls: BaseUrls::default(),
            cache_dir: PathBuf::from("data"),
            element_timeout: Duration::from_secs(4),
            login_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// A configuration with all waits collapsed, for driving fakes.
    #[cfg(test)]
    pub(crate) fn fast() -> Self {
        Self {
            element_timeout: Duration::from_millis(20),
            login_timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(1),
            retry: RetryPolicy {
                attempts: 2,
                backoff: Duration::ZERO,
            },
            ..Self::default()
        }
    }
}
