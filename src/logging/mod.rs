// Logging module for structured logging using the tracing crate

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::Span;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines on stderr
    #[default]
    Text,
    /// One JSON object per event, for log aggregation
    Json,
}

/// Logging error types
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    FilterError(String),

    #[error("Failed to initialize subscriber: {0}")]
    InitError(String),
}

/// Initialize the tracing subscriber for structured logging
///
/// The filter is taken from `RUST_LOG` and defaults to `info`. Logs go to
/// stderr so that stdout stays free for the run summary.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` cannot be parsed or a global subscriber
/// was already installed.
///
/// # Examples
///
/// ```
/// use copymark::logging::{init_subscriber, LogFormat};
///
/// init_subscriber(LogFormat::Text).expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(format: LogFormat) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| LoggingError::FilterError(e.to_string()))?;

    let registry = Registry::default().with(filter);

    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true),
            )
            .try_init(),
    }
    .map_err(|e| LoggingError::InitError(e.to_string()))
}

/// Helper to create the span wrapping one file's processing
#[inline]
pub fn create_file_span(index: usize, total: usize, source: &str) -> Span {
    tracing::info_span!("file", index = index, total = total, source = %source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_initialization_fails_cleanly() {
        // The first call may or may not succeed depending on test ordering;
        // the second must report an error rather than panic.
        let _ = init_subscriber(LogFormat::Text);
        let second = init_subscriber(LogFormat::Json);
        assert!(second.is_err());
    }

    #[test]
    fn test_log_format_default_is_text() {
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }
}
