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
// SPDX-License-Identifier: AGPL-3.0

//! Configuration fixtures.
//!
//! Writes mergewatch configuration files that point at a fixture repository
//! and a cache database inside the same temporary directory.

use crate::repo::TestRepo;
use std::fs;
use std::path::{Path, PathBuf};

/// Test fixture management utilities.
pub struct TestFixtures;

impl TestFixtures {
    /// TOML configuration for `repo` with the given reference branch.
    pub fn config_toml(repo: &TestRepo, reference_branch: &str, database: &Path) -> String {
        format!(
            r#"[repository]
path = "{}"
reference_branch = "{}"
maintain_ticket_refs = true

[cache]
database_path = "{}"

[merge]
committer_name = "Mergewatch Test"
committer_email = "mergewatch@example.com"
vcs_timeout_secs = 30

[observability]
log_level = "warn"
"#,
            toml_path(repo.path()),
            reference_branch,
            toml_path(database),
        )
    }

    /// Write a config file into the repository's temp directory and return its path.
    pub fn write_config(repo: &TestRepo, reference_branch: &str) -> PathBuf {
        let database = repo.git_dir().join("mergewatch.db");
        let config_path = repo.git_dir().join("mergewatch.toml");
        fs::write(
            &config_path,
            Self::config_toml(repo, reference_branch, &database),
        )
        .expect("Failed to write config file");
        config_path
    }
}

/// Paths embedded in TOML strings need forward slashes on Windows.
fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}
