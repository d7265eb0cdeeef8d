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

//! Fixture git repositories for integration tests.
//!
//! Commits are written straight into the object database with libgit2, so
//! tests need neither a `git` binary nor a user identity. Each commit gets a
//! timestamp one minute after the previous one, which keeps time-sorted
//! history walks deterministic.

use git2::build::TreeUpdateBuilder;
use git2::{BranchType, Commit, FileMode, Oid, Repository, Signature, Time};
use std::cell::Cell;
use std::path::Path;
use tempfile::TempDir;

/// Epoch seconds of the first fixture commit
const FIXTURE_EPOCH: i64 = 1_700_000_000;

/// A single change applied by [`TestRepo::apply`]
#[derive(Debug, Clone, Copy)]
pub enum FileChange<'a> {
    /// Create or overwrite a file
    Write(&'a str, &'a str),
    /// Remove a file
    Delete(&'a str),
}

/// A git repository in a temporary directory.
///
/// # Example
/// ```ignore
/// use mergewatch_test_utils::TestRepo;
///
/// let repo = TestRepo::with_initial_commit("develop");
/// repo.create_branch("t/1234", "develop");
/// repo.commit("t/1234", &[("src/lib.rs", "fn main() {}")], "Add lib");
/// ```
pub struct TestRepo {
    repo: Repository,
    temp_dir: TempDir,
    clock: Cell<i64>,
}

impl TestRepo {
    /// Create an empty repository.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let repo = Repository::init(temp_dir.path()).expect("Failed to init git repository");
        Self {
            repo,
            temp_dir,
            clock: Cell::new(FIXTURE_EPOCH),
        }
    }

    /// Create a repository whose `branch` has a single README commit.
    pub fn with_initial_commit(branch: &str) -> Self {
        let repo = Self::new();
        repo.commit(branch, &[("README.md", "# Test Repository\n")], "Initial commit");
        repo
    }

    /// Path to the working directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path to the git directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// The underlying libgit2 handle.
    pub fn git2(&self) -> &Repository {
        &self.repo
    }

    /// Commit file writes on top of `branch`, creating the branch if needed.
    pub fn commit(&self, branch: &str, files: &[(&str, &str)], message: &str) -> Oid {
        let changes: Vec<FileChange<'_>> = files
            .iter()
            .map(|(path, content)| FileChange::Write(path, content))
            .collect();
        self.apply(branch, &changes, message)
    }

    /// Commit file deletions on top of `branch`.
    pub fn delete_files(&self, branch: &str, paths: &[&str], message: &str) -> Oid {
        let changes: Vec<FileChange<'_>> = paths.iter().map(|p| FileChange::Delete(p)).collect();
        self.apply(branch, &changes, message)
    }

    /// Commit `count` single-file commits on `branch`; returns them oldest first.
    pub fn commit_chain(&self, branch: &str, count: usize, prefix: &str) -> Vec<Oid> {
        (1..=count)
            .map(|i| {
                let path = format!("{}/{}.txt", prefix, i);
                let content = format!("change {}\n", i);
                let message = format!("{} commit {}\n\nBody of commit {}", prefix, i, i);
                self.commit(branch, &[(path.as_str(), content.as_str())], &message)
            })
            .collect()
    }

    /// Apply a set of changes as one commit on `branch`.
    ///
    /// A branch that does not exist yet gets a root commit, which is how tests
    /// build unrelated histories.
    pub fn apply(&self, branch: &str, changes: &[FileChange<'_>], message: &str) -> Oid {
        let parent = self.find_tip(branch);
        let baseline = match &parent {
            Some(commit) => commit.tree().expect("Failed to read parent tree"),
            None => {
                let empty = self
                    .repo
                    .treebuilder(None)
                    .and_then(|builder| builder.write())
                    .expect("Failed to write empty tree");
                self.repo.find_tree(empty).expect("Failed to find empty tree")
            }
        };

        let mut builder = TreeUpdateBuilder::new();
        for change in changes {
            match change {
                FileChange::Write(path, content) => {
                    let blob = self.repo.blob(content.as_bytes()).expect("Failed to write blob");
                    builder.upsert(*path, blob, FileMode::Blob);
                }
                FileChange::Delete(path) => {
                    builder.remove(*path);
                }
            }
        }

        let tree_id = builder
            .create_updated(&self.repo, &baseline)
            .expect("Failed to build tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let signature = self.next_signature();
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(
                Some(&format!("refs/heads/{}", branch)),
                &signature,
                &signature,
                message,
                &tree,
                &parents,
            )
            .expect("Failed to commit")
    }

    /// Create `name` pointing at the tip of `from`.
    pub fn create_branch(&self, name: &str, from: &str) -> Oid {
        let commit = self.find_tip(from).expect("Source branch does not exist");
        self.repo
            .branch(name, &commit, false)
            .expect("Failed to create branch");
        commit.id()
    }

    /// Point `name` at `target`, creating or moving the branch.
    pub fn set_branch(&self, name: &str, target: Oid) {
        let commit = self.repo.find_commit(target).expect("Commit does not exist");
        self.repo
            .branch(name, &commit, true)
            .expect("Failed to set branch");
    }

    /// Current tip of `branch`.
    pub fn tip(&self, branch: &str) -> Oid {
        self.find_tip(branch)
            .map(|commit| commit.id())
            .expect("Branch does not exist")
    }

    /// Whether a fully-qualified reference exists.
    pub fn reference_exists(&self, name: &str) -> bool {
        self.repo.find_reference(name).is_ok()
    }

    /// Whether the main object store contains `oid`.
    pub fn has_object(&self, oid: Oid) -> bool {
        self.repo.odb().map(|odb| odb.exists(oid)).unwrap_or(false)
    }

    fn find_tip(&self, branch: &str) -> Option<Commit<'_>> {
        self.repo
            .find_branch(branch, BranchType::Local)
            .ok()
            .and_then(|b| b.get().peel_to_commit().ok())
    }

    fn next_signature(&self) -> Signature<'static> {
        let seconds = self.clock.get();
        self.clock.set(seconds + 60);
        Signature::new("Test User", "test@example.com", &Time::new(seconds, 0))
            .expect("Failed to build signature")
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
