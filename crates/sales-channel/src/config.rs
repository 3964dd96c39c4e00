//! # Sales Channel Configuration
//!
//! Ledger endpoints, timeouts and client-side defaults.

use crate::domain::ChannelError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default read endpoint (metagraph L0).
pub const DEFAULT_L0_URL: &str = "http://localhost:9200";

/// Default write endpoint (metagraph data L1).
pub const DEFAULT_DATA_L1_URL: &str = "http://localhost:9400";

/// Sales channel client configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Base URL serving channel snapshots.
    pub l0_url: String,

    /// Base URL accepting signed data updates.
    pub data_l1_url: String,

    /// Whole-request timeout in milliseconds.
    pub request_timeout_ms: u64,

    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// First snapshot ordinal a new channel is valid from.
    pub start_snapshot_ordinal: u64,

    /// Last snapshot ordinal a new channel is valid to.
    pub end_snapshot_ordinal: u64,

    /// Reconciliation poll interval in seconds.
    pub poll_interval_secs: u64,

    /// Trailing window for sales analytics, in minutes.
    pub analytics_window_minutes: usize,

    /// JSON file backing the local key-value store.
    pub store_path: PathBuf,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            l0_url: DEFAULT_L0_URL.to_string(),
            data_l1_url: DEFAULT_DATA_L1_URL.to_string(),
            request_timeout_ms: 5_000,
            connect_timeout_ms: 2_000,
            start_snapshot_ordinal: 1,
            end_snapshot_ordinal: 10_000,
            poll_interval_secs: 15,
            analytics_window_minutes: 15,
            store_path: PathBuf::from("./sales-channel-store.json"),
        }
    }
}

impl ChannelConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SC_L0_URL`: Snapshot read endpoint (default: http://localhost:9200)
    /// - `SC_DATA_L1_URL`: Data write endpoint (default: http://localhost:9400)
    /// - `SC_REQUEST_TIMEOUT_MS`: Request timeout (default: 5000)
    /// - `SC_POLL_INTERVAL_SECS`: Poll interval (default: 15)
    /// - `SC_STORE_PATH`: Local store file (default: ./sales-channel-store.json)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            l0_url: env::var("SC_L0_URL").unwrap_or(defaults.l0_url),
            data_l1_url: env::var("SC_DATA_L1_URL").unwrap_or(defaults.data_l1_url),
            request_timeout_ms: env::var("SC_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
            poll_interval_secs: env::var("SC_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.poll_interval_secs),
            store_path: env::var("SC_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            ..defaults
        }
    }

    /// Create a config for testing (short timeouts, fast polling).
    pub fn for_testing() -> Self {
        Self {
            request_timeout_ms: 1_000,
            connect_timeout_ms: 500,
            poll_interval_secs: 1,
            store_path: env::temp_dir().join("sales-channel-test-store.json"),
            ..Self::default()
        }
    }

    /// Point both endpoints at one base URL (e.g. a local test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.l0_url = base_url.clone();
        self.data_l1_url = base_url;
        self
    }

    /// Reject configurations the client cannot run with.
    pub fn validate(&self) -> Result<(), ChannelError> {
        for (name, url) in [("l0_url", &self.l0_url), ("data_l1_url", &self.data_l1_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ChannelError::Config(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if self.request_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(ChannelError::Config("timeouts must be non-zero".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(ChannelError::Config("poll interval must be non-zero".into()));
        }
        if self.start_snapshot_ordinal > self.end_snapshot_ordinal {
            return Err(ChannelError::Config(format!(
                "snapshot window is inverted ({} > {})",
                self.start_snapshot_ordinal, self.end_snapshot_ordinal
            )));
        }
        Ok(())
    }
}
