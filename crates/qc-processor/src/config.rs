//! Processor configuration from environment variables.

use crate::domain::errors::ProcessorError;
use serde::{Deserialize, Serialize};
use shared_bus::config::DEFAULT_RECONNECT_INTERVAL;
use shared_bus::StreamConfig;
use std::env;
use std::time::Duration;

/// Upper bound on concurrent executions: the semaphore's permit limit, and
/// every permit must be claimable by one `acquire_many` call when draining.
pub const MAX_CONCURRENT_REQUESTS: usize = {
    let max_u32 = u32::MAX as usize;
    if tokio::sync::Semaphore::MAX_PERMITS < max_u32 {
        tokio::sync::Semaphore::MAX_PERMITS
    } else {
        max_u32
    }
};

/// Settings for a [`crate::TransactionProcessor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Validator endpoint (`tcp://host:port`).
    pub validator_url: String,

    /// Delay between reconnection attempts.
    pub reconnect_interval: Duration,

    /// How long each handler registration may wait for its answer.
    pub registration_timeout: Duration,

    /// How long `stop` waits for the unregister answer and for in-flight
    /// executions.
    pub unregister_timeout: Duration,

    /// Upper bound on handler executions running at once.
    pub max_concurrent_requests: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            validator_url: "tcp://localhost:4004".to_string(),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            registration_timeout: Duration::from_secs(30),
            unregister_timeout: Duration::from_secs(10),
            max_concurrent_requests: 64,
        }
    }
}

impl ProcessorConfig {
    /// Config for `validator_url` with default timings.
    pub fn new(validator_url: impl Into<String>) -> Self {
        Self {
            validator_url: validator_url.into(),
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_VALIDATOR_URL`: Validator endpoint (default: tcp://localhost:4004)
    /// - `QC_RECONNECT_SECS`: Reconnect interval in seconds (default: 2)
    /// - `QC_MAX_CONCURRENT_REQUESTS`: Execution concurrency limit (default: 64)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            validator_url: env::var("QC_VALIDATOR_URL").unwrap_or(defaults.validator_url),

            reconnect_interval: env::var("QC_RECONNECT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.reconnect_interval),

            max_concurrent_requests: env::var("QC_MAX_CONCURRENT_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_concurrent_requests),

            ..defaults
        }
    }

    /// Reject settings the processor cannot run with.
    pub fn validate(&self) -> Result<(), ProcessorError> {
        self.stream_config()
            .socket_addr()
            .map_err(|e| ProcessorError::Config(e.to_string()))?;

        if self.max_concurrent_requests == 0 {
            return Err(ProcessorError::Config(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_requests > MAX_CONCURRENT_REQUESTS {
            return Err(ProcessorError::Config(format!(
                "max_concurrent_requests exceeds {MAX_CONCURRENT_REQUESTS}"
            )));
        }
        if self.registration_timeout.is_zero() || self.unregister_timeout.is_zero() {
            return Err(ProcessorError::Config(
                "timeouts must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Channel settings derived from this config.
    #[must_use]
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig::new(self.validator_url.clone())
            .with_reconnect_interval(self.reconnect_interval)
    }
}
