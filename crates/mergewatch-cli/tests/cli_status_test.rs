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

//! CLI tests for `mergewatch status` and `mergewatch cache`.

use mergewatch_test_utils::{MergewatchCommand, TestFixtures, TestRepo};
use predicates::prelude::*;
use serde_json::Value;

/// develop with one commit, plus a feature branch carrying its own file
fn repo_with_feature() -> TestRepo {
    let repo = TestRepo::with_initial_commit("develop");
    repo.create_branch("u/dev/feature", "develop");
    repo.commit("u/dev/feature", &[("feature.txt", "feature\n")], "Add feature");
    repo
}

fn status_json(repo: &TestRepo, branches: &[&str]) -> Vec<Value> {
    let config = TestFixtures::write_config(repo, "develop");
    let output = MergewatchCommand::new()
        .with_config(&config)
        .arg("status")
        .args(branches)
        .arg("--json")
        .run_success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice::<Vec<Value>>(&output).unwrap()
}

#[test]
fn test_status_fast_forward() {
    let repo = repo_with_feature();
    let reports = status_json(&repo, &["u/dev/feature"]);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["branch"], "u/dev/feature");
    assert_eq!(reports[0]["status"], "fast_forward");
    assert_eq!(reports[0]["badge"]["class"], "positive_review");
    assert_eq!(
        reports[0]["target"],
        repo.tip("u/dev/feature").to_string().as_str()
    );
}

#[test]
fn test_status_mergeable_has_stable_preview() {
    let repo = repo_with_feature();
    repo.commit("develop", &[("other.txt", "other\n")], "Advance develop");

    let first = status_json(&repo, &["u/dev/feature"]);
    assert_eq!(first[0]["status"], "mergeable");
    let preview = first[0]["preview"].as_str().unwrap().to_string();
    assert_eq!(preview.len(), 40);

    // Served from the cache on the second run
    let second = status_json(&repo, &["u/dev/feature"]);
    assert_eq!(second[0]["preview"], preview.as_str());

    // The preview commit is not reachable from any branch
    let oid = git2::Oid::from_str(&preview).unwrap();
    mergewatch_test_utils::assert_unreferenced(repo.git2(), oid);
}

#[test]
fn test_status_conflict() {
    let repo = TestRepo::with_initial_commit("develop");
    repo.create_branch("u/dev/clash", "develop");
    repo.commit("u/dev/clash", &[("README.md", "theirs\n")], "Rewrite readme");
    repo.commit("develop", &[("README.md", "ours\n")], "Rewrite readme differently");

    let reports = status_json(&repo, &["u/dev/clash"]);
    assert_eq!(reports[0]["status"], "conflict");
    assert_eq!(reports[0]["badge"]["class"], "needs_work");
    assert!(reports[0]["preview"].is_null());
}

#[test]
fn test_status_missing_and_invalid_branches() {
    let repo = repo_with_feature();
    let reports = status_json(&repo, &["u/dev/missing", "bad..name", "develop"]);

    assert_eq!(reports[0]["status"], "not_found");
    assert_eq!(reports[1]["status"], "invalid");
    assert!(reports[1]["summary"].as_str().unwrap().contains(".."));
    assert_eq!(reports[2]["status"], "no_commits");
}

#[test]
fn test_status_human_output() {
    let repo = repo_with_feature();
    let config = TestFixtures::write_config(&repo, "develop");

    MergewatchCommand::new()
        .with_config(&config)
        .args(&["--color", "never", "status", "u/dev/feature"])
        .run_success()
        .stdout(predicate::str::contains("u/dev/feature"))
        .stdout(predicate::str::contains("fast-forward"))
        .stdout(predicate::str::contains("Commits"));
}

#[test]
fn test_status_requires_a_branch() {
    let repo = repo_with_feature();
    let config = TestFixtures::write_config(&repo, "develop");

    MergewatchCommand::new()
        .with_config(&config)
        .arg("status")
        .run_failure();
}

#[test]
fn test_status_missing_reference_branch_fails() {
    let repo = repo_with_feature();
    let config = TestFixtures::write_config(&repo, "main");

    MergewatchCommand::new()
        .with_config(&config)
        .args(&["status", "u/dev/feature"])
        .run_failure()
        .stderr(predicate::str::contains("could not be evaluated"));
}

#[test]
fn test_cache_show_and_clear() {
    let repo = repo_with_feature();
    repo.commit("develop", &[("other.txt", "other\n")], "Advance develop");
    let config = TestFixtures::write_config(&repo, "develop");

    MergewatchCommand::new()
        .with_config(&config)
        .args(&["status", "u/dev/feature", "u/dev/missing"])
        .run_success();

    let output = MergewatchCommand::new()
        .with_config(&config)
        .args(&["cache", "show", "--json"])
        .run_success()
        .get_output()
        .stdout
        .clone();
    let rows: Vec<Value> = serde_json::from_slice(&output).unwrap();
    assert_eq!(rows.len(), 1, "only the resolvable branch is cached");
    assert_eq!(rows[0]["branch"], "u/dev/feature");
    assert_eq!(rows[0]["status"], "mergeable");
    assert_eq!(rows[0]["reference"], repo.tip("develop").to_string().as_str());

    MergewatchCommand::new()
        .with_config(&config)
        .args(&["cache", "clear"])
        .run_success()
        .stdout(predicate::str::contains("Cleared 1"));

    MergewatchCommand::new()
        .with_config(&config)
        .args(&["--color", "never", "cache", "show"])
        .run_success()
        .stdout(predicate::str::contains("Cache is empty"));
}
