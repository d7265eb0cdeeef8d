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

//! Branch merge-status engine
//!
//! Given a moving reference branch and a feature branch named on a ticket,
//! the engine decides whether the feature branch integrates cleanly, keeps a
//! stable preview merge commit for clean merges, caches its answers until the
//! reference moves, and writes changelog text for newly pushed commits.
//!
//! # Example
//!
//! ```no_run
//! use mergewatch_config::ConfigLoader;
//! use mergewatch_engine::BranchIntegrationService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().load_with_overrides("mergewatch.toml").await?;
//!     let service = BranchIntegrationService::from_config(&config).await?;
//!
//!     let status = service.evaluate_branch("u/alice/ticket-1234").await?;
//!     println!("{}", status);
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod badge;
pub mod cache;
pub mod changelog;
pub mod error;
pub mod service;
pub mod status;

pub use analyzer::{preview_message, resolve_target, Analysis, MergeAnalyzer, TargetResolution};
pub use badge::{BadgeClass, BadgeLink, BranchBadge};
pub use cache::{CacheEntry, MergeStatusCache};
pub use changelog::{render_changelog, CommitLogBuilder, IgnoreItem, LogEntry, MAX_NEW_COMMITS};
pub use error::{EngineError, EngineResult};
pub use service::{BranchIntegrationService, ServiceSettings, TicketBranchFields, TicketRefUpdate};
pub use status::{Evaluation, MergeStatus, STATUS_ENCODING_VERSION};
