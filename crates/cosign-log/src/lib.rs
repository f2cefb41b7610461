//! Logging utilities for the cosign coordination service.
//!
//! Re-exports the `tracing` macros so every crate logs through one path, and
//! sets up the global `tracing-subscriber` in either JSON or plain text form.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};
pub use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Accepted log level names
pub const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Output format of the global subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON lines
    #[default]
    Json,
    /// Human readable lines
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Json => f.write_str("json"),
            LogFormat::Text => f.write_str("text"),
        }
    }
}

/// Whether `level` names a known level filter
pub fn is_valid_level(level: &str) -> bool {
    LEVELS.contains(&level.to_ascii_lowercase().as_str())
}

/// Initialize the global tracing subscriber with structured JSON output.
///
/// Honors `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .json(),
        )
        .try_init()?;

    Ok(())
}

/// Initialize tracing with an explicit level and output format.
///
/// `RUST_LOG`, when set, still wins over `level`.
pub fn init_tracing_with_level(
    level: &str,
    format: LogFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json(),
            )
            .try_init()?,
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()?,
    }

    Ok(())
}

/// Initialize tracing for tests with simplified output
pub fn init_tracing_test() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_macros() {
        info!("Test info message");
        debug!(sequence_number = 3, "Test debug message");
        warn!("Test warning message");
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::default(), LogFormat::Json);
    }

    #[test]
    fn test_log_format_display_parses_back() {
        for format in [LogFormat::Json, LogFormat::Text] {
            assert_eq!(format.to_string().parse::<LogFormat>().unwrap(), format);
        }
        assert_eq!(LogFormat::Text.to_string(), "text");
    }

    #[test]
    fn test_subscriber_layer_builds() {
        let _layer = fmt::layer::<tracing_subscriber::Registry>().with_target(true);
    }

    #[test]
    fn test_log_format_serde() {
        let json = serde_json::to_string(&LogFormat::Text).unwrap();
        assert_eq!(json, "\"text\"");
    }

    #[test]
    fn test_level_validation() {
        assert!(is_valid_level("info"));
        assert!(is_valid_level("WARN"));
        assert!(!is_valid_level("verbose"));
    }

    #[test]
    fn test_init_tracing_test_is_repeatable() {
        // A second global init fails but must not panic.
        let _ = init_tracing_test();
        assert!(init_tracing_test().is_err());
    }
}
