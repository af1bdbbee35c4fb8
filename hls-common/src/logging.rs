//! Logging configuration and tracing subscriber setup

use crate::{Error, Result};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Logging configuration (`[logging]` section)
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    /// Build the filter directive: RUST_LOG wins, then the configured level
    ///
    /// `verbose` raises the workspace crates to debug so the pipeline's
    /// debug events become visible.
    pub fn env_filter(&self, verbose: bool) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }

        let mut directive = self.level.clone();
        if verbose {
            directive.push_str(",hls_audio=debug,hls_server=debug");
        }

        EnvFilter::try_new(&directive)
            .map_err(|e| Error::Logging(format!("Invalid log level '{}': {}", self.level, e)))
    }
}

/// Initialise the global tracing subscriber
pub fn init_tracing(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = config.env_filter(verbose)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
