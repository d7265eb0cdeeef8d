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

//! Classification of a target branch against the reference branch
//!
//! The analyzer is synchronous and talks to the repository only through
//! [`VcsGateway`]; the service runs it on a blocking thread.

use crate::error::{EngineError, EngineResult};
use crate::status::MergeStatus;
use mergewatch_git::{refname, CommitId, GitError, Identity, VcsGateway};
use tracing::{debug, info, instrument, warn};

/// Message recorded on preview merge commits
pub fn preview_message(target_name: &str, reference_name: &str) -> String {
    format!("Temporary merge of {} into {}", target_name, reference_name)
}

/// What a target branch name refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetResolution {
    /// The name breaks a naming rule; carries the reason
    Invalid(String),
    /// No such branch
    NotFound,
    /// The branch tip
    Found(CommitId),
}

impl TargetResolution {
    /// The resolved tip, if any
    pub fn commit(self) -> Option<CommitId> {
        match self {
            TargetResolution::Found(commit) => Some(commit),
            TargetResolution::Invalid(_) | TargetResolution::NotFound => None,
        }
    }
}

/// Validates `name` and resolves it to its tip.
///
/// Invalid and missing branches are outcomes, not errors; only repository
/// failures are returned as `Err`.
pub fn resolve_target(gateway: &dyn VcsGateway, name: &str) -> EngineResult<TargetResolution> {
    if let Err(violation) = refname::validate(name) {
        debug!(branch = name, %violation, "Rejected branch name");
        return Ok(TargetResolution::Invalid(violation.to_string()));
    }
    match gateway.resolve_branch(name) {
        Ok(commit) => Ok(TargetResolution::Found(commit)),
        Err(e) if e.is_not_found() => Ok(TargetResolution::NotFound),
        Err(e) => Err(e.into()),
    }
}

/// Outcome of an analysis, with the target commit it was computed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// The classification
    pub status: MergeStatus,
    /// Target tip, when the name resolved
    pub target: Option<CommitId>,
}

/// Runs the merge-status state machine
pub struct MergeAnalyzer<'a> {
    gateway: &'a dyn VcsGateway,
    identity: &'a Identity,
    reference_name: &'a str,
}

impl<'a> MergeAnalyzer<'a> {
    /// Creates an analyzer that merges into `reference_name` and signs
    /// preview commits as `identity`
    pub fn new(gateway: &'a dyn VcsGateway, identity: &'a Identity, reference_name: &'a str) -> Self {
        Self {
            gateway,
            identity,
            reference_name,
        }
    }

    /// Evaluates `target_name` against the reference tip `reference`
    pub fn evaluate(&self, reference: &CommitId, target_name: &str) -> EngineResult<Analysis> {
        let target = match resolve_target(self.gateway, target_name)? {
            TargetResolution::Found(target) => target,
            TargetResolution::Invalid(reason) => {
                return Ok(Analysis {
                    status: MergeStatus::Invalid(reason),
                    target: None,
                })
            }
            TargetResolution::NotFound => {
                return Ok(Analysis {
                    status: MergeStatus::NotFound,
                    target: None,
                })
            }
        };

        let status = self.classify(reference, &target, target_name)?;
        Ok(Analysis {
            status,
            target: Some(target),
        })
    }

    /// Classifies an already resolved target
    #[instrument(skip(self), fields(reference_branch = self.reference_name))]
    pub fn classify(
        &self,
        reference: &CommitId,
        target: &CommitId,
        target_name: &str,
    ) -> EngineResult<MergeStatus> {
        let base = match self.gateway.merge_base(reference, target) {
            Ok(base) => base,
            Err(GitError::NoCommonAncestor(..)) => {
                warn!(%reference, %target, "Branch shares no history with the reference");
                return Err(EngineError::Ancestry {
                    reference: reference.to_string(),
                    target: target.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if &base == target {
            return Ok(MergeStatus::NoCommits);
        }
        if &base == reference {
            return Ok(MergeStatus::FastForward);
        }
        if self.gateway.is_ancestor(target, reference)? {
            return Ok(MergeStatus::UpToDate);
        }

        let merged = match self.gateway.attempt_merge(&base, reference, target) {
            Ok(merged) => merged,
            Err(GitError::MergeConflict(paths)) => {
                debug!(conflicts = paths.len(), "Merge does not apply cleanly");
                return Ok(MergeStatus::Conflict);
            }
            Err(e) => return Err(e.into()),
        };

        let tree = self
            .gateway
            .write_objects_for_changed_paths(&merged, merged.changed_paths())?;
        drop(merged);

        let preview = self.gateway.create_detached_commit(
            &tree,
            &[reference.clone(), target.clone()],
            self.identity,
            &preview_message(target_name, self.reference_name),
        )?;

        info!(%preview, "Created preview merge commit");
        Ok(MergeStatus::Mergeable(preview))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use mergewatch_git::{GitResult, MergedTree, TreeId};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    pub(crate) fn id(n: u8) -> CommitId {
        CommitId::parse(&format!("{:040x}", n)).unwrap()
    }

    /// In-memory gateway with scripted answers
    #[derive(Default)]
    pub(crate) struct FakeGateway {
        pub branches: HashMap<String, CommitId>,
        pub bases: HashMap<(CommitId, CommitId), CommitId>,
        pub ancestors: HashSet<(CommitId, CommitId)>,
        pub conflicting: bool,
        pub history: HashMap<CommitId, Vec<CommitId>>,
        pub messages: HashMap<CommitId, String>,
        pub commits: Mutex<Vec<(Vec<CommitId>, String)>>,
        pub copies: Mutex<usize>,
    }

    impl FakeGateway {
        pub fn branch(mut self, name: &str, tip: CommitId) -> Self {
            self.branches.insert(name.to_string(), tip);
            self
        }

        pub fn base(mut self, a: CommitId, b: CommitId, base: CommitId) -> Self {
            self.bases.insert((a.clone(), b.clone()), base.clone());
            self.bases.insert((b, a), base);
            self
        }

        pub fn created(&self) -> Vec<(Vec<CommitId>, String)> {
            self.commits.lock().unwrap().clone()
        }
    }

    impl VcsGateway for FakeGateway {
        fn resolve_branch(&self, name: &str) -> GitResult<CommitId> {
            self.branches
                .get(name)
                .cloned()
                .ok_or_else(|| GitError::BranchNotFound(name.to_string()))
        }

        fn merge_base(&self, a: &CommitId, b: &CommitId) -> GitResult<CommitId> {
            self.bases
                .get(&(a.clone(), b.clone()))
                .cloned()
                .ok_or_else(|| GitError::NoCommonAncestor(a.to_string(), b.to_string()))
        }

        fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> GitResult<bool> {
            Ok(ancestor == descendant
                || self.ancestors.contains(&(ancestor.clone(), descendant.clone())))
        }

        fn attempt_merge(
            &self,
            _base: &CommitId,
            _ours: &CommitId,
            _theirs: &CommitId,
        ) -> GitResult<MergedTree> {
            if self.conflicting {
                return Err(GitError::MergeConflict(vec!["src/lib.rs".to_string()]));
            }
            let tree = TreeId::parse(&format!("{:040x}", 0xeeu8)).unwrap();
            Ok(MergedTree::new(tree, vec!["src/lib.rs".to_string()]))
        }

        fn write_objects_for_changed_paths(
            &self,
            merged: &MergedTree,
            changed_paths: &[String],
        ) -> GitResult<TreeId> {
            *self.copies.lock().unwrap() += changed_paths.len();
            Ok(merged.tree().clone())
        }

        fn create_detached_commit(
            &self,
            _tree: &TreeId,
            parents: &[CommitId],
            _author: &Identity,
            message: &str,
        ) -> GitResult<CommitId> {
            let mut commits = self.commits.lock().unwrap();
            commits.push((parents.to_vec(), message.to_string()));
            Ok(id(200 + commits.len() as u8))
        }

        fn log_ancestors(
            &self,
            from: &CommitId,
            excluding: &[CommitId],
            limit: Option<usize>,
        ) -> GitResult<Vec<CommitId>> {
            let hidden: HashSet<&CommitId> = excluding
                .iter()
                .flat_map(|e| {
                    std::iter::once(e).chain(self.history.get(e).into_iter().flatten())
                })
                .collect();
            let walk = std::iter::once(from)
                .chain(self.history.get(from).into_iter().flatten())
                .filter(|c| !hidden.contains(c))
                .take(limit.unwrap_or(usize::MAX))
                .cloned()
                .collect();
            Ok(walk)
        }

        fn commit_message(&self, id: &CommitId) -> GitResult<String> {
            Ok(self.messages.get(id).cloned().unwrap_or_default())
        }

        fn set_symbolic_ref(&self, _name: &str, _target: &str, _log_message: &str) -> GitResult<()> {
            Ok(())
        }

        fn remove_ref(&self, _name: &str) -> GitResult<bool> {
            Ok(false)
        }
    }

    fn identity() -> Identity {
        Identity::new("mergewatch", "mergewatch@localhost")
    }

    fn evaluate(gateway: &FakeGateway, target: &str) -> EngineResult<Analysis> {
        let identity = identity();
        let reference = gateway.resolve_branch("develop").unwrap();
        MergeAnalyzer::new(gateway, &identity, "develop").evaluate(&reference, target)
    }

    #[test]
    fn test_resolve_target_outcomes() {
        let gateway = FakeGateway::default().branch("u/dev/fix", id(4));

        assert!(matches!(
            resolve_target(&gateway, "u/dev/fix.lock").unwrap(),
            TargetResolution::Invalid(reason) if reason.contains(".lock")
        ));
        assert_eq!(
            resolve_target(&gateway, "u/dev/other").unwrap(),
            TargetResolution::NotFound
        );
        assert_eq!(
            resolve_target(&gateway, "u/dev/fix").unwrap().commit(),
            Some(id(4))
        );
    }

    #[test]
    fn test_invalid_name() {
        let gateway = FakeGateway::default().branch("develop", id(1));
        let analysis = evaluate(&gateway, "u/dev/..broken").unwrap();
        assert!(matches!(analysis.status, MergeStatus::Invalid(_)));
        assert_eq!(analysis.target, None);
    }

    #[test]
    fn test_missing_branch() {
        let gateway = FakeGateway::default().branch("develop", id(1));
        let analysis = evaluate(&gateway, "t/1234").unwrap();
        assert_eq!(analysis.status, MergeStatus::NotFound);
    }

    #[test]
    fn test_unrelated_histories_are_an_error() {
        let gateway = FakeGateway::default()
            .branch("develop", id(1))
            .branch("orphan", id(9));
        let err = evaluate(&gateway, "orphan").unwrap_err();
        assert!(err.is_ancestry());
    }

    #[test]
    fn test_no_commits() {
        let gateway = FakeGateway::default()
            .branch("develop", id(2))
            .branch("t/1234", id(1))
            .base(id(2), id(1), id(1));
        let analysis = evaluate(&gateway, "t/1234").unwrap();
        assert_eq!(analysis.status, MergeStatus::NoCommits);
        assert_eq!(analysis.target, Some(id(1)));
    }

    #[test]
    fn test_fast_forward() {
        let gateway = FakeGateway::default()
            .branch("develop", id(1))
            .branch("t/1234", id(3))
            .base(id(1), id(3), id(1));
        assert_eq!(
            evaluate(&gateway, "t/1234").unwrap().status,
            MergeStatus::FastForward
        );
        assert!(gateway.created().is_empty());
    }

    #[test]
    fn test_up_to_date_checked_before_merging() {
        let mut gateway = FakeGateway::default()
            .branch("develop", id(5))
            .branch("t/1234", id(4))
            .base(id(5), id(4), id(3));
        gateway.ancestors.insert((id(4), id(5)));
        assert_eq!(
            evaluate(&gateway, "t/1234").unwrap().status,
            MergeStatus::UpToDate
        );
        assert!(gateway.created().is_empty());
    }

    #[test]
    fn test_conflict() {
        let mut gateway = FakeGateway::default()
            .branch("develop", id(5))
            .branch("t/1234", id(6))
            .base(id(5), id(6), id(3));
        gateway.conflicting = true;
        assert_eq!(
            evaluate(&gateway, "t/1234").unwrap().status,
            MergeStatus::Conflict
        );
        assert_eq!(*gateway.copies.lock().unwrap(), 0);
    }

    #[test]
    fn test_mergeable_creates_preview_commit() {
        let gateway = FakeGateway::default()
            .branch("develop", id(5))
            .branch("t/1234", id(6))
            .base(id(5), id(6), id(3));
        let analysis = evaluate(&gateway, "t/1234").unwrap();

        let created = gateway.created();
        assert_eq!(created.len(), 1);
        let (parents, message) = &created[0];
        assert_eq!(parents, &vec![id(5), id(6)]);
        assert_eq!(message, "Temporary merge of t/1234 into develop");
        assert_eq!(analysis.status, MergeStatus::Mergeable(id(201)));
        assert_eq!(*gateway.copies.lock().unwrap(), 1);
    }
}
