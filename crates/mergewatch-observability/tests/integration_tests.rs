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
//! Integration tests for logging system
//!
//! The global subscriber can only be installed once per process, so a single
//! test covers installation and the rest build configurations.

use mergewatch_observability::{init_tracing_with_config, LogConfig, LogError, LogFormat, LogOutput};

#[test]
fn test_config_builder_chaining() {
    let config = LogConfig::new()
        .with_format(LogFormat::Json)
        .with_level("debug")
        .with_timestamps(false)
        .with_color(false)
        .with_targets(false)
        .with_output(LogOutput::Stdout);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, Some("debug".to_string()));
    assert!(!config.use_timestamps);
    assert!(!config.use_color);
    assert!(!config.include_targets);
    assert_eq!(config.output, LogOutput::Stdout);
}

#[test]
fn test_quiet_flag_overrides_configured_level() {
    let config = LogConfig::new().with_level("debug").with_verbosity(0, true);
    assert_eq!(config.get_effective_level(), "error");
}

#[test]
fn test_install_once() {
    let config = LogConfig::new()
        .with_format(LogFormat::Compact)
        .with_level("warn")
        .with_color(false);

    assert!(init_tracing_with_config(config.clone()).is_ok());
    tracing::warn!(branch = "t/1234", "subscriber installed");

    let second = init_tracing_with_config(config);
    assert!(matches!(second, Err(LogError::AlreadyInitialized(_))));
}
