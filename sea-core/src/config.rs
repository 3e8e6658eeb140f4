//! Application configuration management.
//!
//! Handles loading, saving, and accessing the stream client configuration:
//! access token, target network, collections to follow, timing, and logging.
//! Configuration is persisted as TOML on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::constants::{self, endpoints};
use crate::error::{SeaError, SeaResult};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Stream connection settings.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which feed the client connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    Mainnet,
    /// Test network.
    #[default]
    Testnet,
}

impl Network {
    /// Base socket endpoint for this network.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Mainnet => endpoints::MAINNET,
            Self::Testnet => endpoints::TESTNET,
        }
    }

    /// Full socket URL with the bearer token attached as a query parameter.
    pub fn socket_url(&self, token: &str) -> String {
        format!("{}?token={token}", self.endpoint())
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

/// Stream connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// API token appended to the socket URL.
    #[serde(default = "default_token")]
    pub token: String,

    /// Target network.
    #[serde(default)]
    pub network: Network,

    /// Collection slugs to follow.
    #[serde(default)]
    pub collections: Vec<String>,

    /// Seconds between heartbeat ticks.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    /// Seconds between connect attempts.
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,

    /// Maximum number of connect attempts.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Capacity of the handler queue. 0 runs handlers inline on the read loop.
    #[serde(default)]
    pub dispatch_queue_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, logs go to the console only.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

// Default value functions for serde

fn default_token() -> String {
    constants::DEFAULT_TOKEN.to_string()
}

fn default_heartbeat_interval() -> u64 {
    constants::DEFAULT_HEARTBEAT_INTERVAL_SECS
}

fn default_retry_interval() -> u64 {
    constants::DEFAULT_RETRY_INTERVAL_SECS
}

fn default_max_retries() -> u32 {
    constants::DEFAULT_MAX_RETRIES
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            token: default_token(),
            network: Network::default(),
            collections: Vec::new(),
            heartbeat_interval_secs: default_heartbeat_interval(),
            retry_interval_secs: default_retry_interval(),
            max_retries: default_max_retries(),
            dispatch_queue_capacity: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl StreamConfig {
    /// Whether a real token has been configured.
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty() && self.token != constants::DEFAULT_TOKEN
    }
}

impl AppConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> SeaResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> SeaResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> SeaResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| SeaError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    ///
    /// - Linux: `~/.config/seastream/config.toml`
    /// - macOS: `~/Library/Application Support/seastream/config.toml`
    /// - Windows: `%APPDATA%/seastream/config.toml`
    pub fn default_config_path() -> SeaResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| SeaError::Config("could not determine config directory".into()))?;
        Ok(base.join(constants::APP_NAME).join("config.toml"))
    }

    /// Get the configured log directory, if file logging is enabled.
    pub fn log_dir(&self) -> Option<PathBuf> {
        if self.logging.directory.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.logging.directory))
        }
    }
}

/// Thread-safe configuration holder for shared access.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigHandle {
    /// Create a new configuration handle.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Read the configuration.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.read().await
    }

    /// Write/update the configuration.
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, AppConfig> {
        self.inner.write().await
    }
}
