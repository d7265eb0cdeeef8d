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

//! Error types for the git capability layer

use thiserror::Error;

/// Result type for Git operations
pub type GitResult<T> = Result<T, GitError>;

/// Error types for Git operations
#[derive(Debug, Error)]
pub enum GitError {
    /// Branch name does not resolve to a local branch
    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    /// The two commits share no history
    #[error("No common ancestor between {0} and {1}")]
    NoCommonAncestor(String, String),

    /// A three-way merge produced conflicts
    #[error("Merge conflict in {} path(s): {}", .0.len(), .0.join(", "))]
    MergeConflict(Vec<String>),

    /// Invalid object id format
    #[error("Invalid object id: {0}")]
    InvalidOid(String),

    /// Branch or reference name rejected by the ref-name rules
    #[error("Invalid reference name '{name}': {reason}")]
    InvalidRefName {
        /// The rejected name
        name: String,
        /// Which rule it violated
        reason: String,
    },

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Repository not initialized
    #[error("Repository not initialized at path: {0}")]
    RepositoryNotFound(String),

    /// Invalid repository state
    #[error("Invalid repository state: {0}")]
    InvalidRepositoryState(String),
}

impl GitError {
    /// Whether this error means the branch simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitError::BranchNotFound(_))
    }
}
