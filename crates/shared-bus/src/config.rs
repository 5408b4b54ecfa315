//! Stream configuration.

use crate::errors::StreamError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default delay between reconnection attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(2);

/// Default upper bound for one frame (64 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Connection settings for the validator channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Validator endpoint, `tcp://host:port` or `host:port`.
    pub url: String,
    /// Delay before re-establishing a lost or refused connection.
    pub reconnect_interval: Duration,
    /// Frames larger than this are rejected in both directions.
    pub max_frame_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: "tcp://localhost:4004".to_string(),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl StreamConfig {
    /// Config for `url` with default timings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Override the reconnect interval.
    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// The `host:port` part of the URL.
    pub fn socket_addr(&self) -> Result<String, StreamError> {
        let addr = self.url.strip_prefix("tcp://").unwrap_or(&self.url);
        let valid = addr
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !valid || addr.contains("://") {
            return Err(StreamError::InvalidAddress(self.url.clone()));
        }
        Ok(addr.to_string())
    }
}
