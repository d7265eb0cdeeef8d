//! Configuration for structured logging.
//!
//! Output format, level filter and destination of the subscriber, plus the
//! mapping from command line verbosity flags to a filter.

use std::io;
use std::str::FromStr;
use thiserror::Error;

/// Crates whose debug output drowns out ours unless asked for explicitly
const QUIET_DEPENDENCIES: &[&str] = &["sqlx=warn"];

/// Errors that can occur during logging configuration
#[derive(Error, Debug)]
pub enum LogError {
    /// Unknown level or format name
    #[error("Invalid log setting: {0}")]
    InvalidSetting(String),

    /// Writer failure
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Filter directive could not be parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A global subscriber is already installed
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Output format for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human-readable output
    #[default]
    Pretty,

    /// Compact single-line format
    Compact,

    /// JSON format for machine-readable logs
    Json,
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(LogError::InvalidSetting(format!(
                "Unknown format: {}. Expected one of: pretty, compact, json",
                s
            ))),
        }
    }
}

/// Log output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Write to standard error
    Stderr,

    /// Write to standard output
    Stdout,
}

/// Configuration for logging
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format for logs
    pub format: LogFormat,

    /// Level filter (e.g. "info", "mergewatch_engine=debug").
    /// Falls back to `RUST_LOG` when unset.
    pub level: Option<String>,

    /// Colored output (ignored for JSON)
    pub use_color: bool,

    /// Include timestamps
    pub use_timestamps: bool,

    /// Include target module names
    pub include_targets: bool,

    /// Output destination
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Pretty,
            level: None,
            use_color: true,
            use_timestamps: true,
            include_targets: true,
            output: LogOutput::Stderr,
        }
    }
}

impl LogConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Enable or disable color output
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Enable or disable timestamps
    pub fn with_timestamps(mut self, use_timestamps: bool) -> Self {
        self.use_timestamps = use_timestamps;
        self
    }

    /// Enable or disable target module names
    pub fn with_targets(mut self, include_targets: bool) -> Self {
        self.include_targets = include_targets;
        self
    }

    /// Set the output destination
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Adjust the configured level by command line verbosity.
    ///
    /// `quiet` wins over `verbose`; one `-v` means debug, two or more trace.
    pub fn with_verbosity(self, verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => self.with_level("error"),
            (false, 0) => self,
            (false, 1) => self.with_level("debug"),
            (false, _) => self.with_level("trace"),
        }
    }

    /// Get the effective log level from config or environment
    pub fn get_effective_level(&self) -> String {
        self.level
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| "info".to_string())
    }

    /// Full filter directive string, with noisy dependencies capped unless
    /// the level already names them
    pub fn filter_directives(&self) -> String {
        let level = self.get_effective_level();
        let mut directives = vec![level.clone()];
        for quiet in QUIET_DEPENDENCIES {
            let krate = quiet.split('=').next().unwrap_or(quiet);
            if !level.contains(krate) {
                directives.push((*quiet).to_string());
            }
        }
        directives.join(",")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("text".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_verbosity_mapping() {
        let base = LogConfig::new().with_level("info");
        assert_eq!(base.clone().with_verbosity(0, false).level.as_deref(), Some("info"));
        assert_eq!(base.clone().with_verbosity(1, false).level.as_deref(), Some("debug"));
        assert_eq!(base.clone().with_verbosity(3, false).level.as_deref(), Some("trace"));
        assert_eq!(base.with_verbosity(2, true).level.as_deref(), Some("error"));
    }

    #[test]
    fn test_effective_level_from_config() {
        let config = LogConfig::new().with_level("debug");
        assert_eq!(config.get_effective_level(), "debug");
    }

    #[test]
    fn test_filter_directives_cap_sqlx() {
        let config = LogConfig::new().with_level("debug");
        assert_eq!(config.filter_directives(), "debug,sqlx=warn");

        let explicit = LogConfig::new().with_level("info,sqlx=debug");
        assert_eq!(explicit.filter_directives(), "info,sqlx=debug");
    }

    #[test]
    fn test_log_output_default() {
        let config = LogConfig::default();
        assert_eq!(config.output, LogOutput::Stderr);
    }
}
