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

//! Entry points used by the ticket system
//!
//! [`BranchIntegrationService`] ties the analyzer, the cache and the changelog
//! builder together. VCS work runs on tokio's blocking pool under a timeout;
//! cache access is async. No lock is held across a VCS call.

use crate::analyzer::{resolve_target, MergeAnalyzer, TargetResolution};
use crate::cache::MergeStatusCache;
use crate::changelog::{render_changelog, CommitLogBuilder, IgnoreItem};
use crate::error::{EngineError, EngineResult};
use crate::status::{Evaluation, MergeStatus};
use mergewatch_config::Config;
use mergewatch_git::{CommitId, Git2Gateway, Identity, VcsGateway};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Settings the service needs, extracted from [`Config`]
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Integration branch name
    pub reference_branch: String,
    /// Identity stamped on preview commits
    pub identity: Identity,
    /// Bound on a single piece of VCS work
    pub vcs_timeout: Duration,
    /// Most commits listed in a changelog block
    pub max_new_commits: usize,
    /// Deep link template for changelog rows
    pub commit_link_template: String,
    /// Whether per-ticket refs are maintained
    pub maintain_ticket_refs: bool,
    /// Prefix of per-ticket refs
    pub ticket_ref_prefix: String,
}

impl ServiceSettings {
    /// Extracts the service settings
    pub fn from_config(config: &Config) -> Self {
        Self {
            reference_branch: config.repository.reference_branch.clone(),
            identity: Identity::new(
                config.merge.committer_name.clone(),
                config.merge.committer_email.clone(),
            ),
            vcs_timeout: Duration::from_secs(config.merge.vcs_timeout_secs),
            max_new_commits: config.changelog.max_new_commits,
            commit_link_template: config.changelog.commit_link_template.clone(),
            maintain_ticket_refs: config.repository.maintain_ticket_refs,
            ticket_ref_prefix: config.repository.ticket_ref_prefix.clone(),
        }
    }
}

/// Normalized ticket fields derived from the raw branch field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketBranchFields {
    /// Trimmed branch name
    pub branch: String,
    /// Resolved commit id, or empty
    pub commit: String,
}

/// What [`BranchIntegrationService::sync_ticket_ref`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketRefUpdate {
    /// Ticket refs are not maintained
    Disabled,
    /// The ticket ref now points at a branch
    Pointed {
        /// Ticket ref name
        name: String,
        /// Branch ref it points at
        target: String,
    },
    /// The ticket ref was deleted
    Removed {
        /// Ticket ref name
        name: String,
    },
    /// There was no ticket ref to delete
    Absent {
        /// Ticket ref name
        name: String,
    },
}

/// Merge status, changelog and ticket-ref operations for one repository
pub struct BranchIntegrationService {
    gateway: Arc<dyn VcsGateway>,
    cache: MergeStatusCache,
    settings: Arc<ServiceSettings>,
}

impl BranchIntegrationService {
    /// Creates a service from its parts
    pub fn new(
        gateway: Arc<dyn VcsGateway>,
        cache: MergeStatusCache,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            gateway,
            cache,
            settings: Arc::new(settings),
        }
    }

    /// Opens the configured repository and cache
    pub async fn from_config(config: &Config) -> EngineResult<Self> {
        let gateway = Git2Gateway::open(&config.repository.path)?;
        let cache = MergeStatusCache::connect(&config.cache.database_path).await?;
        info!(
            repository = %gateway.git_dir().display(),
            reference = %config.repository.reference_branch,
            "Branch integration service ready"
        );
        Ok(Self::new(
            Arc::new(gateway),
            cache,
            ServiceSettings::from_config(config),
        ))
    }

    /// The status cache
    pub fn cache(&self) -> &MergeStatusCache {
        &self.cache
    }

    /// Active settings
    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Runs blocking VCS work off the async runtime, bounded by the timeout.
    ///
    /// On timeout the task keeps running to completion in the background and
    /// its result is discarded.
    async fn blocking<T, F>(&self, operation: &'static str, work: F) -> EngineResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn VcsGateway, &ServiceSettings) -> EngineResult<T> + Send + 'static,
    {
        let gateway = Arc::clone(&self.gateway);
        let settings = Arc::clone(&self.settings);
        let task = tokio::task::spawn_blocking(move || work(gateway.as_ref(), &settings));

        match tokio::time::timeout(self.settings.vcs_timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => {
                error!(operation, "VCS work timed out");
                Err(EngineError::Timeout {
                    operation,
                    seconds: self.settings.vcs_timeout.as_secs(),
                })
            }
        }
    }

    /// Merge status of `target_name` against the reference branch
    pub async fn evaluate_branch(&self, target_name: &str) -> EngineResult<MergeStatus> {
        Ok(self.evaluate_branch_detailed(target_name).await?.status)
    }

    /// Merge status plus the commit ids it was computed against
    #[instrument(skip(self))]
    pub async fn evaluate_branch_detailed(&self, target_name: &str) -> EngineResult<Evaluation> {
        let name = target_name.to_string();
        let (reference, resolution) = self
            .blocking("branch resolution", move |gateway, settings| {
                let reference = gateway.resolve_branch(&settings.reference_branch)?;
                Ok((reference, resolve_target(gateway, &name)?))
            })
            .await?;

        let target = match resolution {
            TargetResolution::Invalid(reason) => {
                return Ok(Evaluation::unresolved(MergeStatus::Invalid(reason), reference))
            }
            TargetResolution::NotFound => {
                return Ok(Evaluation::unresolved(MergeStatus::NotFound, reference))
            }
            TargetResolution::Found(target) => target,
        };

        if let Some(entry) = self.cache.get(target_name, &reference).await? {
            if entry.target == target {
                debug!(status = entry.status.kind(), "Merge status cache hit");
                return Ok(Evaluation::resolved(entry.status, reference, target));
            }
        }

        let name = target_name.to_string();
        let (analysis_reference, analysis_target) = (reference.clone(), target.clone());
        let result = self
            .blocking("merge analysis", move |gateway, settings| {
                MergeAnalyzer::new(gateway, &settings.identity, &settings.reference_branch)
                    .classify(&analysis_reference, &analysis_target, &name)
            })
            .await;

        let status = match result {
            Ok(status) => status,
            Err(e) => {
                error!(branch = target_name, error = %e, "Merge analysis failed");
                return Err(e);
            }
        };

        if status.is_cacheable() {
            self.cache.put(target_name, &reference, &target, &status).await?;
        }
        info!(status = status.kind(), "Evaluated branch");
        Ok(Evaluation::resolved(status, reference, target))
    }

    /// Changelog text for a ticket whose branch field changed to
    /// `new_branch`, listing commits new relative to the reference branch
    /// and `old_commit`.
    #[instrument(skip(self))]
    pub async fn on_branch_field_changed(
        &self,
        old_commit: Option<&CommitId>,
        new_branch: &str,
    ) -> EngineResult<Option<String>> {
        let name = new_branch.trim().to_string();
        let old_commit = old_commit.cloned();

        self.blocking("changelog", move |gateway, settings| {
            let Some(new_commit) = resolve_target(gateway, &name)?.commit() else {
                return Ok(None);
            };
            if old_commit.as_ref() == Some(&new_commit) {
                return Ok(None);
            }

            let mut ignore = vec![IgnoreItem::Branch(settings.reference_branch.clone())];
            ignore.extend(old_commit.map(IgnoreItem::Commit));

            let builder = CommitLogBuilder::new(gateway, &settings.commit_link_template);
            let entries = builder.build_log(
                &new_commit,
                &ignore,
                Some(settings.max_new_commits + 1),
            )?;
            Ok(render_changelog(&entries, settings.max_new_commits))
        })
        .await
    }

    /// Normalizes a raw branch field and derives the commit field
    pub async fn normalize_ticket_branch(&self, raw: &str) -> EngineResult<TicketBranchFields> {
        let branch = raw.trim().to_string();
        if branch.is_empty() {
            return Ok(TicketBranchFields::default());
        }

        let name = branch.clone();
        let resolution = self
            .blocking("branch resolution", move |gateway, _| resolve_target(gateway, &name))
            .await?;

        let commit = resolution
            .commit()
            .map(|commit| commit.to_string())
            .unwrap_or_default();
        Ok(TicketBranchFields { branch, commit })
    }

    /// Points the ticket's symbolic ref at its branch, or removes it when the
    /// branch is empty, invalid or missing
    #[instrument(skip(self))]
    pub async fn sync_ticket_ref(
        &self,
        ticket_id: u64,
        branch: Option<&str>,
    ) -> EngineResult<TicketRefUpdate> {
        if !self.settings.maintain_ticket_refs {
            return Ok(TicketRefUpdate::Disabled);
        }

        let branch = branch.map(str::trim).unwrap_or("").to_string();
        self.blocking("ticket ref update", move |gateway, settings| {
            let name = format!("{}{}", settings.ticket_ref_prefix, ticket_id);

            let exists = !branch.is_empty()
                && matches!(resolve_target(gateway, &branch)?, TargetResolution::Found(_));
            if exists {
                let target = format!("refs/heads/{}", branch);
                gateway.set_symbolic_ref(
                    &name,
                    &target,
                    &format!("mergewatch: ticket #{} branch is {}", ticket_id, branch),
                )?;
                info!(%name, %target, "Ticket ref updated");
                return Ok(TicketRefUpdate::Pointed { name, target });
            }

            if gateway.remove_ref(&name)? {
                info!(%name, "Ticket ref removed");
                Ok(TicketRefUpdate::Removed { name })
            } else {
                Ok(TicketRefUpdate::Absent { name })
            }
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::analyzer::tests::{id, FakeGateway};
    use mergewatch_git::{GitResult, MergedTree, TreeId};

    fn settings() -> ServiceSettings {
        let mut config = Config::default();
        config.repository.maintain_ticket_refs = true;
        ServiceSettings::from_config(&config)
    }

    async fn service(gateway: FakeGateway) -> (BranchIntegrationService, Arc<FakeGateway>) {
        let gateway = Arc::new(gateway);
        let cache = MergeStatusCache::connect(":memory:").await.unwrap();
        let service = BranchIntegrationService::new(
            Arc::clone(&gateway) as Arc<dyn VcsGateway>,
            cache,
            settings(),
        );
        (service, gateway)
    }

    fn mergeable() -> FakeGateway {
        FakeGateway::default()
            .branch("develop", id(5))
            .branch("t/1234", id(6))
            .base(id(5), id(6), id(3))
    }

    #[tokio::test]
    async fn test_mergeable_is_memoized() {
        let (service, gateway) = service(mergeable()).await;
        let first = service.evaluate_branch("t/1234").await.unwrap();
        let second = service.evaluate_branch("t/1234").await.unwrap();

        assert!(matches!(first, MergeStatus::Mergeable(_)));
        assert_eq!(first, second);
        assert_eq!(gateway.created().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_and_missing_skip_cache() {
        let (service, _) = service(mergeable()).await;
        assert!(matches!(
            service.evaluate_branch("bad name").await.unwrap(),
            MergeStatus::Invalid(_)
        ));
        assert_eq!(
            service.evaluate_branch("t/9999").await.unwrap(),
            MergeStatus::NotFound
        );
        assert!(service.cache().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_no_commits_not_cached() {
        let gateway = FakeGateway::default()
            .branch("develop", id(5))
            .branch("t/1", id(3))
            .base(id(5), id(3), id(3));
        let (service, _) = service(gateway).await;
        assert_eq!(
            service.evaluate_branch("t/1").await.unwrap(),
            MergeStatus::NoCommits
        );
        assert!(service.cache().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_stale_target_in_cache_is_recomputed() {
        let (service, gateway) = service(mergeable()).await;
        service
            .cache()
            .put("t/1234", &id(5), &id(4), &MergeStatus::Conflict)
            .await
            .unwrap();

        let evaluation = service.evaluate_branch_detailed("t/1234").await.unwrap();
        assert!(matches!(evaluation.status, MergeStatus::Mergeable(_)));
        assert_eq!(evaluation.target, Some(id(6)));
        assert_eq!(gateway.created().len(), 1);
    }

    #[tokio::test]
    async fn test_ancestry_failure_not_cached() {
        let gateway = FakeGateway::default()
            .branch("develop", id(5))
            .branch("orphan", id(9));
        let (service, _) = service(gateway).await;
        let err = service.evaluate_branch("orphan").await.unwrap_err();
        assert!(err.is_ancestry());
        assert!(service.cache().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_reference_branch_is_an_error() {
        let gateway = FakeGateway::default().branch("t/1", id(1));
        let (service, _) = service(gateway).await;
        let err = service.evaluate_branch("t/1").await.unwrap_err();
        assert_eq!(err.user_message(), "failed to determine merge status");
    }

    struct SlowGateway;

    impl VcsGateway for SlowGateway {
        fn resolve_branch(&self, _name: &str) -> GitResult<CommitId> {
            std::thread::sleep(Duration::from_millis(1500));
            Ok(id(1))
        }
        fn merge_base(&self, a: &CommitId, _b: &CommitId) -> GitResult<CommitId> {
            Ok(a.clone())
        }
        fn is_ancestor(&self, _a: &CommitId, _d: &CommitId) -> GitResult<bool> {
            Ok(false)
        }
        fn attempt_merge(&self, _b: &CommitId, _o: &CommitId, _t: &CommitId) -> GitResult<MergedTree> {
            Err(mergewatch_git::GitError::MergeConflict(Vec::new()))
        }
        fn write_objects_for_changed_paths(&self, m: &MergedTree, _p: &[String]) -> GitResult<TreeId> {
            Ok(m.tree().clone())
        }
        fn create_detached_commit(
            &self,
            _tree: &TreeId,
            _parents: &[CommitId],
            _author: &Identity,
            _message: &str,
        ) -> GitResult<CommitId> {
            Ok(id(2))
        }
        fn log_ancestors(&self, _f: &CommitId, _e: &[CommitId], _l: Option<usize>) -> GitResult<Vec<CommitId>> {
            Ok(Vec::new())
        }
        fn commit_message(&self, _id: &CommitId) -> GitResult<String> {
            Ok(String::new())
        }
        fn set_symbolic_ref(&self, _n: &str, _t: &str, _m: &str) -> GitResult<()> {
            Ok(())
        }
        fn remove_ref(&self, _n: &str) -> GitResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported_and_not_cached() {
        let mut settings = settings();
        settings.vcs_timeout = Duration::from_millis(100);
        let cache = MergeStatusCache::connect(":memory:").await.unwrap();
        let service = BranchIntegrationService::new(Arc::new(SlowGateway), cache, settings);

        let err = service.evaluate_branch("t/1").await.unwrap_err();
        assert!(matches!(err, EngineError::Timeout { .. }));
        assert!(service.cache().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_changelog_skips_unchanged_and_invalid() {
        let (service, _) = service(mergeable()).await;
        assert_eq!(
            service
                .on_branch_field_changed(Some(&id(6)), "t/1234")
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            service.on_branch_field_changed(None, "t/../x").await.unwrap(),
            None
        );
        assert_eq!(
            service.on_branch_field_changed(None, "t/none").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_normalize_ticket_branch() {
        let (service, _) = service(mergeable()).await;
        let fields = service.normalize_ticket_branch("  t/1234 \n").await.unwrap();
        assert_eq!(fields.branch, "t/1234");
        assert_eq!(fields.commit, id(6).to_string());

        let missing = service.normalize_ticket_branch("t/none").await.unwrap();
        assert_eq!(missing.branch, "t/none");
        assert!(missing.commit.is_empty());

        assert_eq!(
            service.normalize_ticket_branch("   ").await.unwrap(),
            TicketBranchFields::default()
        );
    }

    #[tokio::test]
    async fn test_ticket_refs_disabled_by_default() {
        let gateway = Arc::new(mergeable());
        let cache = MergeStatusCache::connect(":memory:").await.unwrap();
        let service = BranchIntegrationService::new(
            gateway,
            cache,
            ServiceSettings::from_config(&Config::default()),
        );
        assert_eq!(
            service.sync_ticket_ref(1234, Some("t/1234")).await.unwrap(),
            TicketRefUpdate::Disabled
        );
    }

    #[tokio::test]
    async fn test_ticket_ref_pointed_or_absent() {
        let (service, _) = service(mergeable().branch("u/dev/fix", id(7))).await;
        assert_eq!(
            service.sync_ticket_ref(1234, Some(" u/dev/fix ")).await.unwrap(),
            TicketRefUpdate::Pointed {
                name: "refs/heads/t/1234".to_string(),
                target: "refs/heads/u/dev/fix".to_string(),
            }
        );
        assert_eq!(
            service.sync_ticket_ref(1234, None).await.unwrap(),
            TicketRefUpdate::Absent {
                name: "refs/heads/t/1234".to_string()
            }
        );
    }
}
