use crate::error::{ConfigError, ConfigResult};
use crate::schema::*;
use mergewatch_git::refname;

/// Validator for configuration settings
pub trait Validator {
    /// Check the settings, returning the first problem found
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        self.repository.validate()?;
        self.merge.validate()?;
        self.cache.validate()?;
        self.changelog.validate()?;
        self.links.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl Validator for RepositoryConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("repository.path".to_string()));
        }

        if let Err(violation) = refname::validate(&self.reference_branch) {
            return Err(ConfigError::invalid_value(
                "repository.reference_branch",
                format!("'{}' is not a valid branch name: {}", self.reference_branch, violation),
            ));
        }

        if !self.ticket_ref_prefix.starts_with("refs/") {
            return Err(ConfigError::invalid_value(
                "repository.ticket_ref_prefix",
                "must start with 'refs/'",
            ));
        }

        // The prefix must yield a valid name once a ticket id is appended
        let sample = format!("{}1", self.ticket_ref_prefix);
        if !refname::is_valid_name(&sample) {
            return Err(ConfigError::invalid_value(
                "repository.ticket_ref_prefix",
                format!("'{}' does not form valid reference names", self.ticket_ref_prefix),
            ));
        }

        Ok(())
    }
}

impl Validator for MergeConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.committer_name.trim().is_empty() {
            return Err(ConfigError::MissingRequired("merge.committer_name".to_string()));
        }

        if !self.committer_email.contains('@') {
            return Err(ConfigError::invalid_value(
                "merge.committer_email",
                "must be an email address",
            ));
        }

        if self.vcs_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "merge.vcs_timeout_secs",
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validator for CacheConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("cache.database_path".to_string()));
        }
        Ok(())
    }
}

impl Validator for ChangelogConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_new_commits == 0 {
            return Err(ConfigError::invalid_value(
                "changelog.max_new_commits",
                "must be greater than 0",
            ));
        }

        if !self.commit_link_template.contains("{id}") {
            return Err(ConfigError::invalid_value(
                "changelog.commit_link_template",
                "must contain the {id} placeholder",
            ));
        }

        Ok(())
    }
}

impl Validator for LinkConfig {
    fn validate(&self) -> ConfigResult<()> {
        let templates = [
            ("links.log_template", &self.log_template),
            ("links.preview_diff_template", &self.preview_diff_template),
            ("links.range_diff_template", &self.range_diff_template),
        ];
        for (field, template) in templates {
            if template.trim().is_empty() {
                return Err(ConfigError::MissingRequired(field.to_string()));
            }
        }
        Ok(())
    }
}

impl Validator for ObservabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        let valid_levels = ["debug", "info", "warn", "error", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.repository.path = "/srv/git/project".to_string();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_repository_path_required() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(field)) if field == "repository.path"
        ));
    }

    #[test]
    fn test_invalid_reference_branch() {
        let mut config = valid_config();
        config.repository.reference_branch = "release..1".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("repository.reference_branch"));
    }

    #[test]
    fn test_ticket_ref_prefix_outside_refs() {
        let mut config = valid_config();
        config.repository.ticket_ref_prefix = "t/".to_string();
        assert!(config.validate().is_err());

        config.repository.ticket_ref_prefix = "refs/heads/t//".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = valid_config();
        config.merge.vcs_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_committer_email_shape() {
        let mut config = valid_config();
        config.merge.committer_email = "mergewatch".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_commit_link_needs_placeholder() {
        let mut config = valid_config();
        config.changelog.commit_link_template = "/changeset/".to_string();
        assert!(config.validate().is_err());

        config.changelog.commit_link_template = "/changeset/{id}".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_new_commits_rejected() {
        let mut config = valid_config();
        config.changelog.max_new_commits = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_link_template() {
        let mut config = valid_config();
        config.links.preview_diff_template = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(field)) if field == "links.preview_diff_template"
        ));
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = valid_config();
        config.observability.log_format = "text".to_string();
        assert!(config.validate().is_err());
    }
}
