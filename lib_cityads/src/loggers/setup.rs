//! # Logging Setup
//!
//! The library itself only emits `tracing` events. Binaries call
//! `setup_logging` once at startup to get:
//!
//! - an `EnvFilter` taken from `RUST_LOG`, or from the configured level,
//! - an ANSI console layer on stdout,
//! - optionally, a JSON layer written to a daily rolling file through a
//!   non-blocking writer.
//!
//! The non-blocking writer flushes on drop of the returned `WorkerGuard`, so
//! callers must keep it alive until they exit.

use std::path::PathBuf;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Where and how verbosely to log.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// File name prefix for rolling log files.
    pub app_name: String,
    /// Level name or full filter directive; `fatal` and `silly` are accepted as aliases.
    pub level: String,
    /// Directory for JSON log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Colour console output.
    pub ansi: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            app_name: "cityads".to_string(),
            level: "info".to_string(),
            log_dir: None,
            ansi: true,
        }
    }
}

/// Maps level names used across the workspace onto `tracing` directives.
pub fn filter_directive(level: &str) -> String {
    match level.trim().to_lowercase().as_str() {
        "" => "info".to_string(),
        "fatal" => "error".to_string(),
        "silly" => "trace".to_string(),
        "warning" => "warn".to_string(),
        other => other.to_string(),
    }
}

/// Installs the global subscriber.
///
/// # Errors
/// Fails if the log directory cannot be created, the level is not a valid
/// filter directive, or a global subscriber is already installed.
pub fn setup_logging(settings: &LogSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let directive = filter_directive(&settings.level);
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&directive)?,
    };

    let (file_layer, guard) = match &settings.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let file_appender = rolling::daily(log_dir, &settings.app_name);
            let (writer, guard) = non_blocking(file_appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = fmt::layer().with_target(true).with_ansi(settings.ansi);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    info!(level = %directive, log_dir = ?settings.log_dir, "Logging initialized");
    Ok(guard)
}
