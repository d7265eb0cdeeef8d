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

//! Isolated scratch repositories
//!
//! A three-way merge is carried out in a throwaway bare repository that
//! borrows the main object store through `objects/info/alternates`. Every
//! object the merge writes (merged blobs, new trees) lands in the scratch
//! store only, so the main repository is untouched until the caller decides
//! to copy objects over.
//!
//! The scratch directory is owned by a [`TempDir`] and removed when the
//! [`ScratchRepository`] is dropped, whichever way the merge attempt exits.

use crate::error::{GitError, GitResult};
use git2::Repository;
use std::fmt;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, trace};

/// Prefix for scratch directory names
const SCRATCH_PREFIX: &str = "mergewatch-scratch-";

/// A temporary bare repository layered over a main object store
pub struct ScratchRepository {
    // Declared before `dir` so the handle is closed before the directory is removed.
    repo: Repository,
    dir: TempDir,
}

impl ScratchRepository {
    /// Creates a scratch repository reading through to `objects_dir`
    pub fn create(objects_dir: &Path) -> GitResult<Self> {
        if !objects_dir.is_dir() {
            return Err(GitError::InvalidRepositoryState(format!(
                "object directory {} does not exist",
                objects_dir.display()
            )));
        }

        let dir = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
        Repository::init_bare(dir.path())?;

        let info_dir = dir.path().join("objects").join("info");
        fs::create_dir_all(&info_dir)?;
        fs::write(
            info_dir.join("alternates"),
            format!("{}\n", objects_dir.display()),
        )?;

        // Reopen so libgit2 picks up the alternate.
        let repo = Repository::open_bare(dir.path())?;
        debug!(scratch = %dir.path().display(), "Created scratch repository");

        Ok(Self { repo, dir })
    }

    /// The scratch repository handle
    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Location of the scratch repository on disk
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for ScratchRepository {
    fn drop(&mut self) {
        trace!(scratch = %self.dir.path().display(), "Releasing scratch repository");
    }
}

impl fmt::Debug for ScratchRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchRepository")
            .field("path", &self.dir.path())
            .finish()
    }
}
