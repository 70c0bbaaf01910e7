//! Subscriber setup for the gateway
//!
//! Events go to the console and, when `[logging] local_enabled = true`, to a
//! JSON file under `local_path` (`aegis.log`, rotated per `local_rotation`).
//! Each governance request runs inside a `governance` span carrying its
//! request id, user and department, so span fields appear on every event of
//! that request. `RUST_LOG` overrides the configured level.

use crate::config::LoggingConfig;
use crate::domain::{AegisError, Result};
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_NAME: &str = "aegis.log";

/// Keeps the file writer alive; dropping it flushes pending lines
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// Fails with [`AegisError::Configuration`] for an unknown level, an
/// uncreatable log directory, or when a subscriber is already installed.
///
/// ```no_run
/// use aegis::config::LoggingConfig;
/// use aegis::logging::init_logging;
///
/// let guard = init_logging("debug", &LoggingConfig::default()).expect("logging");
/// tracing::info!("Gateway started");
/// drop(guard);
/// ```
pub fn init_logging(log_level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_log_level(log_level)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aegis={level}")));

    let console = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(filter.clone());

    let (file, file_guard) = if config.local_enabled {
        std::fs::create_dir_all(&config.local_path).map_err(|e| {
            AegisError::Configuration(format!(
                "Failed to create log directory {}: {e}",
                config.local_path
            ))
        })?;

        let appender = RollingFileAppender::new(
            rotation(&config.local_rotation),
            &config.local_path,
            LOG_FILE_NAME,
        );
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(writer)
            .with_filter(filter);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| AegisError::Configuration(format!("Failed to install log subscriber: {e}")))?;

    tracing::debug!(
        level = %level,
        file = config.local_enabled,
        path = %config.local_path,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn parse_log_level(level: &str) -> Result<Level> {
    Level::from_str(level.trim()).map_err(|_| {
        AegisError::Configuration(format!(
            "Invalid log level '{level}': expected trace, debug, info, warn or error"
        ))
    })
}

fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}
