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

//! Custom test assertions over repository state.

use git2::{Oid, Repository};

/// Assert that `branch` still points at `expected`.
pub fn assert_branch_at(repo: &Repository, branch: &str, expected: Oid) {
    let actual = repo
        .find_branch(branch, git2::BranchType::Local)
        .unwrap_or_else(|_| panic!("branch {} should exist", branch))
        .get()
        .peel_to_commit()
        .expect("branch should point at a commit")
        .id();
    assert_eq!(actual, expected, "branch {} moved", branch);
}

/// Assert that no reference in the repository points at `commit`.
pub fn assert_unreferenced(repo: &Repository, commit: Oid) {
    for reference in repo.references().expect("Failed to list references") {
        let reference = reference.expect("Failed to read reference");
        if let Ok(target) = reference.peel_to_commit() {
            assert_ne!(
                target.id(),
                commit,
                "reference {:?} points at {}",
                reference.name(),
                commit
            );
        }
    }
}

/// Assert that `commit` has exactly the given parents, in order.
pub fn assert_parents(repo: &Repository, commit: Oid, parents: &[Oid]) {
    let commit = repo.find_commit(commit).expect("commit should exist");
    let actual: Vec<Oid> = commit.parent_ids().collect();
    assert_eq!(actual, parents, "unexpected parents for {}", commit.id());
}
