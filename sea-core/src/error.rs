//! Global error types for the stream client.
//!
//! Every failure the workspace can report is folded into a single `SeaError`
//! enum with conversions from the underlying library errors.

use thiserror::Error;

/// Convenience type alias for Results using SeaError.
pub type SeaResult<T> = Result<T, SeaError>;

/// Unified error type for the stream client.
#[derive(Error, Debug)]
pub enum SeaError {
    // -- Configuration errors --
    /// Failed to load, parse or validate configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Connection errors --
    /// Dialing the socket failed on every permitted attempt.
    #[error("connect failed after {attempts} retries: {reason}")]
    ConnectFailed {
        /// Number of dial attempts made.
        attempts: u32,
        /// Error reported by the last attempt.
        reason: String,
    },

    /// Another connect call is still dialing.
    #[error("connect already in progress")]
    ConnectInProgress,

    /// The operation needs a live socket and there is none.
    #[error("socket is not connected")]
    NotConnected,

    /// Socket-level send/close failure.
    #[error("socket error: {0}")]
    Socket(String),

    // -- Subscription errors --
    /// A topic identifier was rejected before anything was sent.
    #[error("invalid topic: {0}")]
    InvalidTopic(String),

    // -- Data errors --
    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // -- Generic --
    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for SeaError {
    fn from(e: serde_json::Error) -> Self {
        SeaError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for SeaError {
    fn from(e: toml::de::Error) -> Self {
        SeaError::Config(e.to_string())
    }
}
