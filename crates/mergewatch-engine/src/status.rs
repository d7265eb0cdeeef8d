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

//! Merge status model and its persisted encoding
//!
//! Cached statuses are stored as a small versioned JSON document, e.g.
//! `{"v":1,"kind":"mergeable","commit":"<id>"}`. Documents with an unknown
//! version or shape decode to `None` and are treated as a cache miss.

use crate::error::{EngineError, EngineResult};
use mergewatch_git::CommitId;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Version written into every encoded status
pub const STATUS_ENCODING_VERSION: u32 = 1;

/// Outcome of evaluating a target branch against the reference branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStatus {
    /// The name breaks the ref-name rules; carries the violated rule
    Invalid(String),
    /// No local branch with that name
    NotFound,
    /// The target adds nothing over the merge base
    NoCommits,
    /// The reference is an ancestor of the target
    FastForward,
    /// The target is already contained in the reference
    UpToDate,
    /// The three-way merge does not apply cleanly
    Conflict,
    /// Clean merge; carries the preview merge commit
    Mergeable(CommitId),
}

impl MergeStatus {
    /// Whether this outcome may be stored in the cache
    pub fn is_cacheable(&self) -> bool {
        matches!(
            self,
            MergeStatus::FastForward
                | MergeStatus::UpToDate
                | MergeStatus::Conflict
                | MergeStatus::Mergeable(_)
        )
    }

    /// Stable lowercase identifier
    pub fn kind(&self) -> &'static str {
        match self {
            MergeStatus::Invalid(_) => "invalid",
            MergeStatus::NotFound => "not_found",
            MergeStatus::NoCommits => "no_commits",
            MergeStatus::FastForward => "fast_forward",
            MergeStatus::UpToDate => "up_to_date",
            MergeStatus::Conflict => "conflict",
            MergeStatus::Mergeable(_) => "mergeable",
        }
    }

    /// Preview merge commit, for [`MergeStatus::Mergeable`]
    pub fn preview(&self) -> Option<&CommitId> {
        match self {
            MergeStatus::Mergeable(id) => Some(id),
            _ => None,
        }
    }

    /// Serializes a cacheable status
    pub fn encode(&self) -> EngineResult<String> {
        let status = match self {
            MergeStatus::FastForward => StoredStatus::FastForward,
            MergeStatus::UpToDate => StoredStatus::UpToDate,
            MergeStatus::Conflict => StoredStatus::Conflict,
            MergeStatus::Mergeable(commit) => StoredStatus::Mergeable {
                commit: commit.clone(),
            },
            other => return Err(EngineError::NotCacheable(other.kind().to_string())),
        };
        let record = StoredRecord {
            v: STATUS_ENCODING_VERSION,
            status,
        };
        Ok(serde_json::to_string(&record)?)
    }

    /// Parses a stored status; anything unrecognised is `None`
    pub fn decode(encoded: &str) -> Option<Self> {
        let value: serde_json::Value = match serde_json::from_str(encoded) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Ignoring unparseable cached status");
                return None;
            }
        };

        let version = value.get("v").and_then(serde_json::Value::as_u64);
        if version != Some(u64::from(STATUS_ENCODING_VERSION)) {
            warn!(?version, "Ignoring cached status with unknown encoding version");
            return None;
        }

        match serde_json::from_value::<StoredRecord>(value) {
            Ok(record) => Some(record.status.into()),
            Err(e) => {
                warn!(error = %e, "Ignoring cached status with unknown shape");
                None
            }
        }
    }
}

impl fmt::Display for MergeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStatus::Invalid(reason) => write!(f, "invalid branch name ({})", reason),
            MergeStatus::NotFound => write!(f, "branch does not exist"),
            MergeStatus::NoCommits => write!(f, "no commits on branch yet"),
            MergeStatus::FastForward => write!(f, "fast-forward"),
            MergeStatus::UpToDate => write!(f, "already merged"),
            MergeStatus::Conflict => write!(f, "does not merge cleanly"),
            MergeStatus::Mergeable(id) => write!(f, "merges cleanly (preview {})", id.short()),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredRecord {
    v: u32,
    #[serde(flatten)]
    status: StoredStatus,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StoredStatus {
    FastForward,
    UpToDate,
    Conflict,
    Mergeable { commit: CommitId },
}

impl From<StoredStatus> for MergeStatus {
    fn from(stored: StoredStatus) -> Self {
        match stored {
            StoredStatus::FastForward => MergeStatus::FastForward,
            StoredStatus::UpToDate => MergeStatus::UpToDate,
            StoredStatus::Conflict => MergeStatus::Conflict,
            StoredStatus::Mergeable { commit } => MergeStatus::Mergeable(commit),
        }
    }
}

/// A status together with the commits it was computed against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// The outcome
    pub status: MergeStatus,
    /// Reference branch tip at evaluation time
    pub reference: CommitId,
    /// Target branch tip, when the target resolved
    pub target: Option<CommitId>,
}

impl Evaluation {
    /// Evaluation of a target that never resolved
    pub fn unresolved(status: MergeStatus, reference: CommitId) -> Self {
        Self {
            status,
            reference,
            target: None,
        }
    }

    /// Evaluation of a resolved target
    pub fn resolved(status: MergeStatus, reference: CommitId, target: CommitId) -> Self {
        Self {
            status,
            reference,
            target: Some(target),
        }
    }
}
