//! seastream core - foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the stream client:
//! - Configuration (token, network, collections, timing) persisted as TOML
//! - A single error type covering every failure category
//! - Structured logging with tracing
//! - Common constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;

// Re-export commonly used items at the crate root
pub use config::{AppConfig, ConfigHandle, Network, StreamConfig};
pub use error::{SeaError, SeaResult};
pub use logging::init_logging;
