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

//! CLI command helpers for testing the mergewatch binary.
//!
//! Provides convenient wrappers around assert_cmd.

use assert_cmd::Command;
use std::path::Path;

/// Creates a new mergewatch Command for testing.
///
/// # Example
/// ```ignore
/// use mergewatch_test_utils::mergewatch;
///
/// mergewatch()
///     .args(["check-name", "fix/bug"])
///     .assert()
///     .success();
/// ```
#[allow(deprecated)] // cargo_bin is deprecated but still works for our use case
pub fn mergewatch() -> Command {
    Command::cargo_bin("mergewatch").expect("mergewatch binary not found")
}

/// Fluent API wrapper for common mergewatch command patterns.
pub struct MergewatchCommand {
    cmd: Command,
}

impl MergewatchCommand {
    /// Create a new MergewatchCommand.
    pub fn new() -> Self {
        Self { cmd: mergewatch() }
    }

    /// Run against the given configuration file.
    pub fn with_config(mut self, config: &Path) -> Self {
        self.cmd.arg("--config").arg(config);
        self
    }

    /// Set the working directory for the command.
    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.cmd.current_dir(dir);
        self
    }

    /// Add an argument to the command.
    pub fn arg(mut self, arg: &str) -> Self {
        self.cmd.arg(arg);
        self
    }

    /// Add multiple arguments to the command.
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    /// Execute the command and assert success.
    pub fn run_success(mut self) -> assert_cmd::assert::Assert {
        self.cmd.assert().success()
    }

    /// Execute the command and assert failure.
    pub fn run_failure(mut self) -> assert_cmd::assert::Assert {
        self.cmd.assert().failure()
    }

    /// Get the underlying Command for custom assertions.
    pub fn into_inner(self) -> Command {
        self.cmd
    }
}

impl Default for MergewatchCommand {
    fn default() -> Self {
        Self::new()
    }
}
