//! Logging for tachi-activity
//!
//! Every run appends to a daily log file in the XDG state directory
//! (`~/.local/state/tachi-activity/tachi-activity.log.<date>`). With
//! `--verbose` the same events are also shown on stderr, and this crate's
//! clumping and fetch events are raised to debug so each page and clump count
//! is visible.

use std::io::IsTerminal;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};

const LOG_FILE_PREFIX: &str = "tachi-activity.log";

/// Crates whose events `--verbose` lifts to debug.
const VERBOSE_TARGETS: &[&str] = &["tachi_activity_core", "tachi_activity"];

/// Initialize the global subscriber.
///
/// `RUST_LOG` overrides both the configured level and `verbose`.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<LoggingGuard> {
    let log_dir = Config::state_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directives(&config.level, verbose)).map_err(|e| {
            Error::Config(format!("invalid logging.level {:?}: {}", config.level, e))
        })?,
    };

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let stderr_layer = if verbose {
        Some(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false)
                .compact(),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialized: {}", e)))?;

    tracing::debug!(log_dir = %log_dir.display(), level = %config.level, verbose, "Logging initialized");

    Ok(LoggingGuard { _guard: guard })
}

/// Initialize logging for tests (captured by the test harness)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Keeps the background log writer alive; pending lines are flushed on drop.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Filter directives for the configured level, lifted for `--verbose`.
fn filter_directives(level: &str, verbose: bool) -> String {
    let level = level.trim();
    if !verbose {
        return level.to_string();
    }

    let mut directives = vec![level.to_string()];
    directives.extend(VERBOSE_TARGETS.iter().map(|target| format!("{}=debug", target)));
    directives.join(",")
}
