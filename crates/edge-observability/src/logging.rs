//! Tracing subscriber setup.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format (for development).
    #[default]
    Human,
    /// JSON format (for production/log aggregation).
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Human,
            level: "warn".to_string(),
        }
    }
}

/// Errors installing the subscriber.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// The filter directive does not parse.
    #[error("Invalid log filter `{directive}`: {message}")]
    InvalidFilter { directive: String, message: String },

    /// A global subscriber is already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `config.level`.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingError> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(env.as_deref(), &config.level)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Human => builder.compact().try_init(),
    };
    result.map_err(|e| LoggingError::Init(e.to_string()))?;

    debug!(format = %config.format, "tracing initialised");
    Ok(())
}

/// Filter from an environment directive, falling back to `level` when it is
/// unset or does not parse.
fn build_filter(env: Option<&str>, level: &str) -> Result<EnvFilter, LoggingError> {
    if let Some(filter) = env.and_then(|directive| EnvFilter::try_new(directive).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| LoggingError::InvalidFilter {
        directive: level.to_string(),
        message: e.to_string(),
    })
}
