//! Unified logging system
//!
//! Structured logging with configurable output. `RUST_LOG` takes precedence over
//! the configured level when it is set.

use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Append to this file instead of stdout
    pub log_file_path: Option<String>,
    /// Custom filter directives
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            log_file_path: None,
            filter_directives: vec!["tower_http=debug".to_string()],
        }
    }
}

impl LoggingConfig {
    fn env_filter(&self) -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }

        let mut filter = EnvFilter::try_new(&self.level)?;
        for directive in &self.filter_directives {
            filter = filter.add_directive(directive.parse()?);
        }
        Ok(filter)
    }
}

/// Initialize the logging system
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = config.env_filter()?;

    let writer = match &config.log_file_path {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stdout),
    };

    let base = fmt::layer()
        .with_writer(writer)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Json => base.json().boxed(),
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parses_lowercase() {
        let config: LoggingConfig = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_bad_directive_is_reported() {
        let config = LoggingConfig {
            filter_directives: vec!["bookshelf=loudest".to_string()],
            ..Default::default()
        };
        if std::env::var("RUST_LOG").is_err() {
            assert!(config.env_filter().is_err());
        }
    }
}
