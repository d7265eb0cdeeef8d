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

//! Error types for the merge-status engine

use mergewatch_git::GitError;
use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Failures while evaluating a branch or maintaining the cache
///
/// None of these are ever cached; the next evaluation retries from scratch.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The reference and target share no history
    #[error("No common ancestor between {reference} and {target}")]
    Ancestry {
        /// Reference commit id
        reference: String,
        /// Target commit id
        target: String,
    },

    /// Any other VCS failure
    #[error("VCS operation failed: {0}")]
    Vcs(#[from] GitError),

    /// VCS work exceeded the configured bound
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        /// What was running
        operation: &'static str,
        /// Configured bound
        seconds: u64,
    },

    /// Cache database failure
    #[error("Cache error: {0}")]
    Cache(#[from] sqlx::Error),

    /// A status could not be serialized for the cache
    #[error("Status encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Only definitive outcomes may be stored
    #[error("Status '{0}' cannot be cached")]
    NotCacheable(String),

    /// The blocking VCS task panicked or was cancelled
    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl EngineError {
    /// Short explanation suitable for a badge tooltip
    pub fn user_message(&self) -> &'static str {
        match self {
            EngineError::Ancestry { .. } => "failed to determine common ancestor",
            _ => "failed to determine merge status",
        }
    }

    /// Whether the failure is about missing shared history
    pub fn is_ancestry(&self) -> bool {
        matches!(self, EngineError::Ancestry { .. })
    }
}
