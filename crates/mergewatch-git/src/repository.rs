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

//! libgit2-backed [`VcsGateway`]
//!
//! The gateway stores only the repository location and opens a fresh
//! [`Repository`] handle per call, so it can be shared across threads without
//! any lock being held while git works.

use crate::error::{GitError, GitResult};
use crate::gateway::{Identity, MergedTree, VcsGateway};
use crate::oid::{CommitId, TreeId};
use crate::refname;
use crate::scratch::ScratchRepository;
use git2::{
    BranchType, Commit, ErrorCode, Index, MergeOptions, ObjectType, Odb, Oid, Reference,
    ReferenceType, Repository, Signature, Sort,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Git repository accessed through libgit2
#[derive(Debug, Clone)]
pub struct Git2Gateway {
    git_dir: PathBuf,
    objects_dir: PathBuf,
}

impl Git2Gateway {
    /// Opens the repository at `path`, failing fast if it is not a git repository
    pub fn open(path: impl AsRef<Path>) -> GitResult<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|e| {
            GitError::RepositoryNotFound(format!("{}: {}", path.display(), e))
        })?;

        let git_dir = std::fs::canonicalize(repo.path())?;
        let objects_dir = git_dir.join("objects");
        info!(repository = %git_dir.display(), "Opened git repository");

        Ok(Self {
            git_dir,
            objects_dir,
        })
    }

    /// The repository's git directory
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn repo(&self) -> GitResult<Repository> {
        Ok(Repository::open(&self.git_dir)?)
    }
}

fn not_found_as(err: git2::Error, name: &str) -> GitError {
    if err.code() == ErrorCode::NotFound {
        GitError::BranchNotFound(name.to_string())
    } else {
        GitError::Git2(err)
    }
}

/// Refuses to touch anything but symbolic references
fn ensure_symbolic(reference: &Reference<'_>, name: &str) -> GitResult<()> {
    if reference.kind() == Some(ReferenceType::Symbolic) {
        Ok(())
    } else {
        Err(GitError::InvalidRepositoryState(format!(
            "{} exists and is not a symbolic reference",
            name
        )))
    }
}

fn conflicting_paths(index: &Index) -> GitResult<Vec<String>> {
    let mut paths = BTreeSet::new();
    for conflict in index.conflicts()? {
        let conflict = conflict?;
        let entry = conflict
            .our
            .as_ref()
            .or(conflict.their.as_ref())
            .or(conflict.ancestor.as_ref());
        if let Some(entry) = entry {
            paths.insert(String::from_utf8_lossy(&entry.path).into_owned());
        }
    }
    Ok(paths.into_iter().collect())
}

/// Copies one object between stores; returns 1 if it was missing from `target`
fn copy_object(source: &Odb<'_>, target: &Odb<'_>, oid: Oid) -> GitResult<usize> {
    if target.exists(oid) {
        return Ok(0);
    }
    let object = source.read(oid)?;
    let written = target.write(object.kind(), object.data())?;
    if written != oid {
        return Err(GitError::InvalidRepositoryState(format!(
            "object {} was stored as {}",
            oid, written
        )));
    }
    Ok(1)
}

impl VcsGateway for Git2Gateway {
    #[instrument(level = "debug", skip(self))]
    fn resolve_branch(&self, name: &str) -> GitResult<CommitId> {
        refname::validate(name).map_err(|violation| GitError::InvalidRefName {
            name: name.to_string(),
            reason: violation.to_string(),
        })?;

        let repo = self.repo()?;
        let branch = repo
            .find_branch(name, BranchType::Local)
            .map_err(|e| not_found_as(e, name))?;
        let commit = branch
            .get()
            .peel_to_commit()
            .map_err(|e| not_found_as(e, name))?;
        Ok(commit.id().into())
    }

    #[instrument(level = "debug", skip(self))]
    fn merge_base(&self, a: &CommitId, b: &CommitId) -> GitResult<CommitId> {
        let repo = self.repo()?;
        match repo.merge_base(a.to_oid()?, b.to_oid()?) {
            Ok(oid) => Ok(oid.into()),
            Err(e) if e.code() == ErrorCode::NotFound => Err(GitError::NoCommonAncestor(
                a.to_string(),
                b.to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(level = "debug", skip(self))]
    fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> GitResult<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        let repo = self.repo()?;
        Ok(repo.graph_descendant_of(descendant.to_oid()?, ancestor.to_oid()?)?)
    }

    #[instrument(level = "debug", skip(self))]
    fn attempt_merge(
        &self,
        base: &CommitId,
        ours: &CommitId,
        theirs: &CommitId,
    ) -> GitResult<MergedTree> {
        let workspace = ScratchRepository::create(&self.objects_dir)?;

        let (tree, changed_paths) = {
            let repo = workspace.repo();
            let base_tree = repo.find_commit(base.to_oid()?)?.tree()?;
            let our_tree = repo.find_commit(ours.to_oid()?)?.tree()?;
            let their_tree = repo.find_commit(theirs.to_oid()?)?.tree()?;

            let mut opts = MergeOptions::new();
            opts.find_renames(true);

            let mut index = repo.merge_trees(&base_tree, &our_tree, &their_tree, Some(&opts))?;
            if index.has_conflicts() {
                let paths = conflicting_paths(&index)?;
                debug!(conflicts = paths.len(), "Merge attempt produced conflicts");
                return Err(GitError::MergeConflict(paths));
            }

            let tree_oid = index.write_tree_to(repo)?;
            let merged_tree = repo.find_tree(tree_oid)?;
            let diff = repo.diff_tree_to_tree(Some(&our_tree), Some(&merged_tree), None)?;

            let mut paths = BTreeSet::new();
            for delta in diff.deltas() {
                for file in [delta.old_file(), delta.new_file()] {
                    if let Some(path) = file.path() {
                        paths.insert(path.to_string_lossy().replace('\\', "/"));
                    }
                }
            }

            (TreeId::from(tree_oid), paths.into_iter().collect::<Vec<_>>())
        };

        debug!(tree = %tree, changed = changed_paths.len(), "Merge attempt succeeded");
        Ok(MergedTree::in_workspace(tree, changed_paths, workspace))
    }

    #[instrument(level = "debug", skip(self, merged, changed_paths), fields(tree = %merged.tree()))]
    fn write_objects_for_changed_paths(
        &self,
        merged: &MergedTree,
        changed_paths: &[String],
    ) -> GitResult<TreeId> {
        let main = self.repo()?;
        let target = main.odb()?;
        let root_oid = merged.tree().to_oid()?;

        let Some(workspace) = merged.workspace() else {
            if target.exists(root_oid) {
                return Ok(merged.tree().clone());
            }
            return Err(GitError::InvalidRepositoryState(format!(
                "merged tree {} is not in the object store",
                merged.tree()
            )));
        };

        let source_repo = workspace.repo();
        let source = source_repo.odb()?;
        let root = source_repo.find_tree(root_oid)?;
        let mut copied = copy_object(&source, &target, root_oid)?;

        for path in changed_paths {
            let mut current = root.clone();
            for component in path.split('/') {
                let entry = current.get_name(component).map(|e| (e.id(), e.kind()));
                match entry {
                    Some((id, Some(ObjectType::Tree))) => {
                        copied += copy_object(&source, &target, id)?;
                        current = source_repo.find_tree(id)?;
                    }
                    Some((id, Some(ObjectType::Blob))) => {
                        copied += copy_object(&source, &target, id)?;
                        break;
                    }
                    // Deleted paths and submodule links carry no objects of their own.
                    _ => break,
                }
            }
        }

        debug!(copied, "Copied merged objects into main store");
        Ok(merged.tree().clone())
    }

    #[instrument(level = "debug", skip(self, author, message))]
    fn create_detached_commit(
        &self,
        tree: &TreeId,
        parents: &[CommitId],
        author: &Identity,
        message: &str,
    ) -> GitResult<CommitId> {
        let repo = self.repo()?;
        let tree = repo.find_tree(tree.to_oid()?)?;

        let mut parent_commits = Vec::with_capacity(parents.len());
        for parent in parents {
            parent_commits.push(repo.find_commit(parent.to_oid()?)?);
        }
        let parent_refs: Vec<&Commit<'_>> = parent_commits.iter().collect();

        let signature = Signature::now(&author.name, &author.email)?;
        let oid = repo.commit(None, &signature, &signature, message, &tree, &parent_refs)?;
        debug!(commit = %oid, "Created detached commit");
        Ok(oid.into())
    }

    #[instrument(level = "debug", skip(self))]
    fn log_ancestors(
        &self,
        from: &CommitId,
        excluding: &[CommitId],
        limit: Option<usize>,
    ) -> GitResult<Vec<CommitId>> {
        let repo = self.repo()?;
        let mut walk = repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        walk.push(from.to_oid()?)?;
        for hidden in excluding {
            walk.hide(hidden.to_oid()?)?;
        }

        let mut commits = Vec::new();
        for oid in walk {
            if limit.is_some_and(|limit| commits.len() >= limit) {
                break;
            }
            commits.push(CommitId::from(oid?));
        }
        Ok(commits)
    }

    fn commit_message(&self, id: &CommitId) -> GitResult<String> {
        let repo = self.repo()?;
        let commit = repo.find_commit(id.to_oid()?)?;
        Ok(String::from_utf8_lossy(commit.message_bytes()).into_owned())
    }

    #[instrument(level = "debug", skip(self, log_message))]
    fn set_symbolic_ref(&self, name: &str, target: &str, log_message: &str) -> GitResult<()> {
        let repo = self.repo()?;
        if let Ok(existing) = repo.find_reference(name) {
            ensure_symbolic(&existing, name)?;
        }
        repo.reference_symbolic(name, target, true, log_message)?;
        info!(reference = name, target, "Updated symbolic reference");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn remove_ref(&self, name: &str) -> GitResult<bool> {
        let repo = self.repo()?;
        let removed = match repo.find_reference(name) {
            Ok(mut reference) => {
                ensure_symbolic(&reference, name)?;
                reference.delete()?;
                info!(reference = name, "Removed reference");
                true
            }
            Err(e) if e.code() == ErrorCode::NotFound => false,
            Err(e) => {
                warn!(reference = name, error = %e, "Failed to look up reference");
                return Err(e.into());
            }
        };
        Ok(removed)
    }
}
