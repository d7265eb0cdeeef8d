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

//! The capability surface the merge-status engine consumes
//!
//! [`VcsGateway`] is deliberately narrow: resolve, ancestry, an isolated
//! merge attempt, object copying, detached commit creation and a bounded
//! ancestor walk. Nothing here can move or delete a branch; the only refs it
//! may touch are the per-ticket symbolic pointers.

use crate::error::GitResult;
use crate::oid::{CommitId, TreeId};
use crate::scratch::ScratchRepository;

/// Author/committer identity stamped on preview commits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

impl Identity {
    /// Creates a new identity
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Result of a clean three-way merge
///
/// Holds the merged tree id, the paths that differ from the "ours" side, and
/// the scratch workspace whose object store contains the merged objects. The
/// workspace is released when the value is dropped.
#[derive(Debug)]
pub struct MergedTree {
    tree: TreeId,
    changed_paths: Vec<String>,
    workspace: Option<ScratchRepository>,
}

impl MergedTree {
    /// A merged tree whose objects already live in the main store
    pub fn new(tree: TreeId, changed_paths: Vec<String>) -> Self {
        Self {
            tree,
            changed_paths,
            workspace: None,
        }
    }

    /// A merged tree backed by a scratch workspace
    pub fn in_workspace(
        tree: TreeId,
        changed_paths: Vec<String>,
        workspace: ScratchRepository,
    ) -> Self {
        Self {
            tree,
            changed_paths,
            workspace: Some(workspace),
        }
    }

    /// Id of the merged tree
    pub fn tree(&self) -> &TreeId {
        &self.tree
    }

    /// Paths whose content differs from the reference side
    pub fn changed_paths(&self) -> &[String] {
        &self.changed_paths
    }

    /// The scratch workspace, if the merge ran in one
    pub fn workspace(&self) -> Option<&ScratchRepository> {
        self.workspace.as_ref()
    }
}

/// Repository operations used by the merge-status engine
///
/// Implementations must be safe to share between threads; every call is
/// blocking and may be slow.
pub trait VcsGateway: Send + Sync {
    /// Resolves a local branch name to the commit it points at
    ///
    /// Fails with [`GitError::BranchNotFound`](crate::GitError::BranchNotFound)
    /// when no such branch exists.
    fn resolve_branch(&self, name: &str) -> GitResult<CommitId>;

    /// Best common ancestor of two commits
    ///
    /// Fails with [`GitError::NoCommonAncestor`](crate::GitError::NoCommonAncestor)
    /// for unrelated histories.
    fn merge_base(&self, a: &CommitId, b: &CommitId) -> GitResult<CommitId>;

    /// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor)
    fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> GitResult<bool>;

    /// Three-way merge of `theirs` into `ours` over `base`, without touching the
    /// main repository
    ///
    /// Fails with [`GitError::MergeConflict`](crate::GitError::MergeConflict)
    /// when the merge does not apply cleanly.
    fn attempt_merge(
        &self,
        base: &CommitId,
        ours: &CommitId,
        theirs: &CommitId,
    ) -> GitResult<MergedTree>;

    /// Copies the objects under `changed_paths` that the main store lacks
    fn write_objects_for_changed_paths(
        &self,
        merged: &MergedTree,
        changed_paths: &[String],
    ) -> GitResult<TreeId>;

    /// Writes a commit object without updating any reference
    fn create_detached_commit(
        &self,
        tree: &TreeId,
        parents: &[CommitId],
        author: &Identity,
        message: &str,
    ) -> GitResult<CommitId>;

    /// Commits reachable from `from` but from none of `excluding`, newest first
    ///
    /// Ordered topologically, ties broken by commit time. Each call walks
    /// from scratch.
    fn log_ancestors(
        &self,
        from: &CommitId,
        excluding: &[CommitId],
        limit: Option<usize>,
    ) -> GitResult<Vec<CommitId>>;

    /// Full message of a commit
    fn commit_message(&self, id: &CommitId) -> GitResult<String>;

    /// Creates or replaces a symbolic reference
    ///
    /// Refuses to replace an existing direct reference.
    fn set_symbolic_ref(&self, name: &str, target: &str, log_message: &str) -> GitResult<()>;

    /// Deletes a symbolic reference; returns whether it existed
    ///
    /// Refuses to delete a direct reference.
    fn remove_ref(&self, name: &str) -> GitResult<bool>;
}
