use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default name of the configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mergewatch.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Repository location and reference branch
    pub repository: RepositoryConfig,

    /// Preview merge settings
    pub merge: MergeConfig,

    /// Merge status cache settings
    pub cache: CacheConfig,

    /// Changelog generation settings
    pub changelog: ChangelogConfig,

    /// URL templates for status badges
    pub links: LinkConfig,

    /// Observability settings
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load config from a file, or fall back to defaults plus environment
    /// overrides when the file does not exist
    pub async fn load(path: impl AsRef<Path>) -> crate::ConfigResult<Self> {
        use crate::ConfigLoader;
        let path = path.as_ref();
        let loader = ConfigLoader::new();

        if !path.exists() {
            return loader.load_from_env();
        }

        loader.load_with_overrides(path).await
    }

    /// Save config as pretty TOML
    pub fn save(&self, path: impl AsRef<Path>) -> crate::ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

/// Repository configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositoryConfig {
    /// Path to the repository (working tree or bare)
    #[serde(default)]
    pub path: String,

    /// Integration branch that targets are merged into
    #[serde(default = "default_reference_branch")]
    pub reference_branch: String,

    /// Keep a symbolic per-ticket reference pointing at the ticket's branch
    #[serde(default)]
    pub maintain_ticket_refs: bool,

    /// Prefix of per-ticket references
    #[serde(default = "default_ticket_ref_prefix")]
    pub ticket_ref_prefix: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            reference_branch: default_reference_branch(),
            maintain_ticket_refs: false,
            ticket_ref_prefix: default_ticket_ref_prefix(),
        }
    }
}

/// Preview merge configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeConfig {
    /// Name recorded on preview merge commits
    #[serde(default = "default_committer_name")]
    pub committer_name: String,

    /// Email recorded on preview merge commits
    #[serde(default = "default_committer_email")]
    pub committer_email: String,

    /// Upper bound for a single evaluation's VCS work (in seconds)
    #[serde(default = "default_vcs_timeout_secs")]
    pub vcs_timeout_secs: u64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            committer_name: default_committer_name(),
            committer_email: default_committer_email(),
            vcs_timeout_secs: default_vcs_timeout_secs(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// SQLite database file, or `:memory:`
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl CacheConfig {
    /// Whether the cache lives only for the lifetime of the process
    pub fn is_in_memory(&self) -> bool {
        self.database_path == ":memory:"
    }
}

/// Changelog configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangelogConfig {
    /// Most commits listed when a branch field changes
    #[serde(default = "default_max_new_commits")]
    pub max_new_commits: usize,

    /// Deep link for a commit; `{id}` is replaced by the full commit id
    #[serde(default = "default_commit_link_template")]
    pub commit_link_template: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            max_new_commits: default_max_new_commits(),
            commit_link_template: default_commit_link_template(),
        }
    }
}

/// URL templates used by status badges.
///
/// Placeholders: `{branch}`, `{reference}`, `{target}` and `{preview}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
    /// Log of the commits on the target that the reference lacks
    #[serde(default = "default_log_template")]
    pub log_template: String,

    /// Diff between the reference and the preview merge commit
    #[serde(default = "default_preview_diff_template")]
    pub preview_diff_template: String,

    /// Diff range for a fast-forward
    #[serde(default = "default_range_diff_template")]
    pub range_diff_template: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            log_template: default_log_template(),
            preview_diff_template: default_preview_diff_template(),
            range_diff_template: default_range_diff_template(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservabilityConfig {
    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_reference_branch() -> String {
    "develop".to_string()
}

fn default_ticket_ref_prefix() -> String {
    "refs/heads/t/".to_string()
}

fn default_committer_name() -> String {
    "mergewatch".to_string()
}

fn default_committer_email() -> String {
    "mergewatch@localhost".to_string()
}

fn default_vcs_timeout_secs() -> u64 {
    30
}

fn default_database_path() -> String {
    "mergewatch.db".to_string()
}

fn default_max_new_commits() -> usize {
    10
}

fn default_commit_link_template() -> String {
    "changeset:{id}".to_string()
}

fn default_log_template() -> String {
    "/log/?rev={target}&stop_rev={reference}".to_string()
}

fn default_preview_diff_template() -> String {
    "/changeset?old={reference}&new={preview}".to_string()
}

fn default_range_diff_template() -> String {
    "/changeset?old={reference}&new={target}".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
