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
use crate::error::{ConfigError, ConfigResult};
use crate::schema::Config;
use crate::validation::Validator;
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, info};

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        let format = ConfigFormat::from_path(path)?;
        let config = self.parse(&content, format)?;

        info!(
            "Configuration loaded from {} ({})",
            path.display(),
            format.name()
        );
        Ok(config)
    }

    /// Load configuration from a string
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        self.parse(content, format)
    }

    /// Load a file and apply `MERGEWATCH_*` environment overrides on top
    pub async fn load_with_overrides<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let mut config = ConfigLoader::without_validation().load_file(path).await?;
        self.apply_env_overrides(&mut config)?;
        self.finish(config)
    }

    /// Build configuration from defaults and environment variables only
    pub fn load_from_env(&self) -> ConfigResult<Config> {
        let mut config = Config::default();
        self.apply_env_overrides(&mut config)?;
        self.finish(config)
    }

    fn parse(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config: Config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        self.finish(config)
    }

    fn finish(&self, config: Config) -> ConfigResult<Config> {
        if self.validate {
            config.validate()?;
        }
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&self, config: &mut Config) -> ConfigResult<()> {
        // Repository settings
        if let Ok(value) = std::env::var("MERGEWATCH_REPOSITORY_PATH") {
            config.repository.path = value;
        }
        if let Ok(value) = std::env::var("MERGEWATCH_REFERENCE_BRANCH") {
            config.repository.reference_branch = value;
        }
        if let Ok(value) = std::env::var("MERGEWATCH_MAINTAIN_TICKET_REFS") {
            config.repository.maintain_ticket_refs =
                parse_bool("MERGEWATCH_MAINTAIN_TICKET_REFS", &value)?;
        }

        // Merge settings
        if let Ok(value) = std::env::var("MERGEWATCH_VCS_TIMEOUT_SECS") {
            config.merge.vcs_timeout_secs = parse_number(
                "MERGEWATCH_VCS_TIMEOUT_SECS",
                &value,
                "expected a whole number of seconds",
            )?;
        }

        // Cache settings
        if let Ok(value) = std::env::var("MERGEWATCH_CACHE_DATABASE") {
            config.cache.database_path = value;
        }

        // Changelog settings
        if let Ok(value) = std::env::var("MERGEWATCH_MAX_NEW_COMMITS") {
            config.changelog.max_new_commits = parse_number(
                "MERGEWATCH_MAX_NEW_COMMITS",
                &value,
                "expected valid integer",
            )?;
        }

        // Observability settings
        if let Ok(value) = std::env::var("MERGEWATCH_LOG_LEVEL") {
            config.observability.log_level = value;
        }
        if let Ok(value) = std::env::var("MERGEWATCH_LOG_FORMAT") {
            config.observability.log_format = value;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number<T: FromStr>(variable: &str, value: &str, reason: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_var_parsing_error(variable, value, reason))
}

/// Parse boolean from string
fn parse_bool(variable: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::env_var_parsing_error(
            variable,
            value,
            "expected 'true', 'false', 'yes', 'no', '1', '0', 'on', or 'off'",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_format_detection() {
        assert_eq!(
            ConfigFormat::from_path("mergewatch.toml").unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path("mergewatch.yml").unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path("mergewatch.json").unwrap(),
            ConfigFormat::Json
        );
        assert!(matches!(
            ConfigFormat::from_path("mergewatch.ini"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ConfigFormat::from_path("mergewatch"),
            Err(ConfigError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(parse_bool("X", "YES").unwrap());
        assert!(parse_bool("X", "1").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
        assert!(!parse_bool("X", "no").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_parse_number_reports_variable() {
        let err = parse_number::<u64>("MERGEWATCH_VCS_TIMEOUT_SECS", "soon", "nope").unwrap_err();
        assert!(err.to_string().contains("MERGEWATCH_VCS_TIMEOUT_SECS=soon"));
        assert_eq!(parse_number::<u64>("X", " 45 ", "nope").unwrap(), 45);
    }

    #[test]
    fn test_load_toml_string() {
        let toml = r#"
            [repository]
            path = "/srv/git/project.git"
            reference_branch = "master"

            [cache]
            database_path = ":memory:"
        "#;
        let config = ConfigLoader::new()
            .load_from_string(toml, ConfigFormat::Toml)
            .unwrap();
        assert_eq!(config.repository.reference_branch, "master");
        assert!(config.cache.is_in_memory());
    }

    #[test]
    fn test_load_rejects_missing_repository_path() {
        let result = ConfigLoader::new().load_from_string("[cache]\n", ConfigFormat::Toml);
        assert!(matches!(result, Err(ConfigError::MissingRequired(_))));

        let unchecked = ConfigLoader::without_validation()
            .load_from_string("[cache]\n", ConfigFormat::Toml)
            .unwrap();
        assert!(unchecked.repository.path.is_empty());
    }
}
