//! Client connection options.

use std::time::Duration;

use sea_core::config::{Network, StreamConfig};
use sea_core::constants;
use sea_core::error::{SeaError, SeaResult};

use crate::handlers::DispatchMode;

/// Options for a [`StreamClient`](crate::StreamClient).
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API token appended to the socket URL.
    pub token: String,
    /// Target network.
    pub network: Network,
    /// Collections the heartbeat covers from the start.
    pub topics: Vec<String>,
    /// Interval between heartbeat ticks.
    pub heartbeat_interval: Duration,
    /// Wait between connect attempts.
    pub retry_interval: Duration,
    /// Maximum number of connect attempts.
    pub max_retries: u32,
    /// How handlers are invoked.
    pub dispatch: DispatchMode,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            token: constants::DEFAULT_TOKEN.to_string(),
            network: Network::default(),
            topics: Vec::new(),
            heartbeat_interval: Duration::from_secs(constants::DEFAULT_HEARTBEAT_INTERVAL_SECS),
            retry_interval: Duration::from_secs(constants::DEFAULT_RETRY_INTERVAL_SECS),
            max_retries: constants::DEFAULT_MAX_RETRIES,
            dispatch: DispatchMode::Inline,
        }
    }
}

impl ClientOptions {
    /// Default options with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    /// Build options from the `[stream]` config section.
    pub fn from_config(config: &StreamConfig) -> Self {
        let dispatch = match config.dispatch_queue_capacity {
            0 => DispatchMode::Inline,
            capacity => DispatchMode::Queued { capacity },
        };
        Self {
            token: config.token.clone(),
            network: config.network,
            topics: config.collections.clone(),
            heartbeat_interval: Duration::from_secs(config.heartbeat_interval_secs),
            retry_interval: Duration::from_secs(config.retry_interval_secs),
            max_retries: config.max_retries,
            dispatch,
        }
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Replace the initial topic list.
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Socket URL for the configured network and token.
    pub fn socket_url(&self) -> String {
        self.network.socket_url(&self.token)
    }

    /// Check the options before dialing.
    pub fn validate(&self) -> SeaResult<()> {
        if self.token.trim().is_empty() {
            return Err(SeaError::MissingConfig("token".into()));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(SeaError::Config("heartbeat interval must be non-zero".into()));
        }
        if self.retry_interval.is_zero() {
            return Err(SeaError::Config("retry interval must be non-zero".into()));
        }
        if self.max_retries == 0 {
            return Err(SeaError::Config("max retries must be at least 1".into()));
        }
        if self.dispatch == (DispatchMode::Queued { capacity: 0 }) {
            return Err(SeaError::Config("dispatch queue capacity must be non-zero".into()));
        }
        Ok(())
    }
}
