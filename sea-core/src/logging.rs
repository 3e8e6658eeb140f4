//! Log output for embedders of the stream client.
//!
//! The client only emits `tracing` events; nothing is printed until one of
//! these initialisers installs a subscriber. Stream state changes log at
//! info, dropped frames and failed sends at warn, and per-frame traffic at
//! trace, so `sea_stream=trace` shows every frame.

use std::path::Path;

use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{SeaError, SeaResult};

/// Log to stderr and to `seastream.log` in `log_dir`, rolled daily.
///
/// `level` is an `EnvFilter` directive such as `info` or
/// `sea_stream=trace`; an unparsable directive falls back to `info`. With
/// `json_output` the file gets one JSON object per event, for shipping to a
/// log collector. Fails if a global subscriber is already installed.
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> SeaResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, "seastream.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    if json_output {
        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| SeaError::Config(format!("logging already initialized: {e}")))?;
    } else {
        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| SeaError::Config(format!("logging already initialized: {e}")))?;
    }

    tracing::info!("logging initialized at level={level}, dir={}", log_dir.display());

    Ok(LogGuard { _guard: Some(guard) })
}

/// Set up logging from the `[logging]` config section.
///
/// An empty `directory` means stderr only.
pub fn init_from_config(config: &LoggingConfig) -> SeaResult<LogGuard> {
    if config.directory.is_empty() {
        init_console_logging(&config.level);
        return Ok(LogGuard { _guard: None });
    }
    init_logging(&config.level, Path::new(&config.directory), config.json_output)
}

/// Keep this for the life of the process; the log file stops receiving
/// events once it is dropped.
pub struct LogGuard {
    _guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Stderr-only logging. A no-op when a subscriber is already installed.
pub fn init_console_logging(level: &str) {
    let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).compact())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_logging_does_not_panic() {
        // Subsequent calls are no-ops.
        init_console_logging("debug");
        init_console_logging("not a level ((");
    }

    #[test]
    fn test_file_logging_after_global_subscriber_is_error() {
        init_console_logging("info");
        let dir = tempfile::TempDir::new().unwrap();

        let result = init_logging("info", &dir.path().join("logs"), false);

        assert!(matches!(result, Err(SeaError::Config(_))));
        assert!(dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_init_from_config_without_directory() {
        let guard = init_from_config(&LoggingConfig::default());
        assert!(guard.is_ok());
    }
}
