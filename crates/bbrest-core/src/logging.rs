//! Process-wide logging setup.
//!
//! Call [`init`] once at startup. Library code only emits `tracing`
//! events and never installs a subscriber itself.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log file name prefix inside the log directory
pub const LOG_FILE_PREFIX: &str = "bb_rest_helper";

/// Default log directory
pub const DEFAULT_LOG_DIR: &str = "./logs";

/// Rotated log files kept on disk
const DEFAULT_MAX_LOG_FILES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogRotation {
    Minutely,
    #[default]
    Hourly,
    Daily,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Minutely => Rotation::MINUTELY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Stderr,
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. `debug` or `bbrest_core=info`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub destination: LogDestination,
    pub rotation: LogRotation,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            destination: LogDestination::Directory(PathBuf::from(DEFAULT_LOG_DIR)),
            rotation: LogRotation::default(),
            max_files: DEFAULT_MAX_LOG_FILES,
        }
    }
}

impl LogConfig {
    pub fn stderr(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            destination: LogDestination::Stderr,
            ..Self::default()
        }
    }
}

/// Install the global subscriber.
///
/// Returns the writer guard for file destinations; keep it alive until
/// shutdown so buffered lines are flushed. Fails if a subscriber is
/// already installed.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.destination {
        LogDestination::Stderr => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .try_init()
                .context("Logging has already been initialised")?;
            Ok(None)
        }
        LogDestination::Directory(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(config.rotation.into())
                .filename_prefix(LOG_FILE_PREFIX)
                .max_log_files(config.max_files)
                .build(dir)
                .context("Failed to create rolling log file")?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .try_init()
                .context("Logging has already been initialised")?;
            tracing::info!(dir = %dir.display(), "Logging has been set up");
            Ok(Some(guard))
        }
    }
}
