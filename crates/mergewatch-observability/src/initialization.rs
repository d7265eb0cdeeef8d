// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Logging initialization and setup.

use crate::config::{LogConfig, LogError, LogFormat, LogOutput};
use std::io;
use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Initialize tracing with the specified format and optional log level.
///
/// # Example
///
/// ```ignore
/// use mergewatch_observability::{init_tracing, LogFormat};
///
/// init_tracing(LogFormat::Pretty, Some("debug")).unwrap();
/// tracing::info!("mergewatch started");
/// ```
pub fn init_tracing(format: LogFormat, level: Option<&str>) -> Result<(), LogError> {
    let config = LogConfig::new()
        .with_format(format)
        .with_level(level.unwrap_or("info"));
    init_tracing_with_config(config)
}

/// Initialize tracing with a detailed configuration.
///
/// Fails with [`LogError::AlreadyInitialized`] when a global subscriber has
/// already been installed in this process.
pub fn init_tracing_with_config(config: LogConfig) -> Result<(), LogError> {
    let env_filter = build_env_filter(&config)?;

    Registry::default()
        .with(env_filter)
        .with(build_layer(&config))
        .try_init()
        .map_err(|e| LogError::AlreadyInitialized(e.to_string()))
}

/// Build the formatting layer for the configured format
fn build_layer<S>(config: &LogConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer()
        .with_writer(get_writer(&config.output))
        .with_target(config.include_targets);

    match (config.format, config.use_timestamps) {
        (LogFormat::Pretty, true) => layer
            .with_ansi(config.use_color)
            .with_span_events(FmtSpan::CLOSE)
            .pretty()
            .boxed(),
        (LogFormat::Pretty, false) => layer
            .with_ansi(config.use_color)
            .with_span_events(FmtSpan::CLOSE)
            .pretty()
            .without_time()
            .boxed(),
        (LogFormat::Compact, true) => layer.with_ansi(config.use_color).compact().boxed(),
        (LogFormat::Compact, false) => layer
            .with_ansi(config.use_color)
            .compact()
            .without_time()
            .boxed(),
        (LogFormat::Json, true) => layer.with_ansi(false).json().boxed(),
        (LogFormat::Json, false) => layer.with_ansi(false).json().without_time().boxed(),
    }
}

/// Get the writer for the specified output
fn get_writer(output: &LogOutput) -> fn() -> Box<dyn io::Write + Send> {
    match output {
        LogOutput::Stderr => || Box::new(io::stderr()),
        LogOutput::Stdout => || Box::new(io::stdout()),
    }
}

/// Build an environment filter for the given configuration
fn build_env_filter(config: &LogConfig) -> Result<EnvFilter, LogError> {
    let directives = config.filter_directives();

    EnvFilter::try_new(&directives).map_err(|e| {
        LogError::ConfigError(format!("Failed to parse log filter '{}': {}", directives, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Installing the global subscriber is covered once, in tests/integration_tests.rs.

    #[test]
    fn test_env_filter_parsing() {
        let result = build_env_filter(&LogConfig::new().with_level("mergewatch_engine=debug"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let result = build_env_filter(&LogConfig::new().with_level("mergewatch_engine=loud"));
        assert!(matches!(result, Err(LogError::ConfigError(_))));
    }
}
