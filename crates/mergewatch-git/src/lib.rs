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

//! # Mergewatch Git Layer
//!
//! This crate is the only place mergewatch talks to git. It provides:
//!
//! - **Ref-name validation**: [`refname::is_valid_name`] rejects names git
//!   would refuse, before they reach libgit2
//! - **Object ids**: validated [`CommitId`] / [`TreeId`] newtypes
//! - **The gateway**: the [`VcsGateway`] trait and its libgit2 implementation
//!   [`Git2Gateway`]
//! - **Isolated merges**: three-way merges run in a [`ScratchRepository`]
//!   that reads the main object store through an alternate and is deleted
//!   when dropped
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mergewatch_git::{Git2Gateway, VcsGateway};
//!
//! let gateway = Git2Gateway::open("/srv/git/project.git")?;
//! let develop = gateway.resolve_branch("develop")?;
//! let feature = gateway.resolve_branch("t/1234")?;
//! let base = gateway.merge_base(&develop, &feature)?;
//! println!("merge base: {}", base.short());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod gateway;
pub mod oid;
pub mod refname;
pub mod repository;
pub mod scratch;

pub use error::{GitError, GitResult};
pub use gateway::{Identity, MergedTree, VcsGateway};
pub use oid::{CommitId, TreeId, SHORT_ID_LEN};
pub use refname::{is_valid_name, RefNameViolation};
pub use repository::Git2Gateway;
pub use scratch::ScratchRepository;
