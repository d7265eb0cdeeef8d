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

//! Display mapping for a branch field
//!
//! Turns an [`Evaluation`] into the badge a ticket page shows next to the
//! branch name: a CSS class, an optional tooltip and a set of links.

use crate::error::EngineError;
use crate::status::{Evaluation, MergeStatus};
use mergewatch_config::LinkConfig;
use serde::Serialize;

/// Badge styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeClass {
    /// Something must be fixed before the branch can be merged
    NeedsWork,
    /// The branch can be merged
    PositiveReview,
    /// Neutral
    None,
}

impl BadgeClass {
    /// CSS class name, if any
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            BadgeClass::NeedsWork => Some("needs_work"),
            BadgeClass::PositiveReview => Some("positive_review"),
            BadgeClass::None => None,
        }
    }
}

/// A labelled hyperlink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeLink {
    /// Link text
    pub label: String,
    /// Target URL
    pub href: String,
}

/// What a ticket page renders for a branch field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchBadge {
    /// Styling
    pub class: BadgeClass,
    /// Tooltip or label text
    pub title: Option<String>,
    /// Links to log and diff views
    pub links: Vec<BadgeLink>,
}

impl BranchBadge {
    fn needs_work(title: impl Into<String>, links: Vec<BadgeLink>) -> Self {
        Self {
            class: BadgeClass::NeedsWork,
            title: Some(title.into()),
            links,
        }
    }

    /// Maps an evaluation of `branch` to its badge
    pub fn from_evaluation(evaluation: &Evaluation, branch: &str, links: &LinkConfig) -> Self {
        let urls = UrlContext {
            branch,
            reference: evaluation.reference.as_str(),
            target: evaluation.target.as_ref().map(|t| t.as_str()).unwrap_or(""),
            preview: evaluation.status.preview().map(|p| p.as_str()).unwrap_or(""),
        };
        let commits = || BadgeLink {
            label: "Commits".to_string(),
            href: urls.expand(&links.log_template),
        };

        match &evaluation.status {
            MergeStatus::Invalid(reason) => {
                Self::needs_work(format!("not a valid branch name: {}", reason), Vec::new())
            }
            MergeStatus::NotFound => Self::needs_work("branch does not exist", Vec::new()),
            MergeStatus::NoCommits => Self::needs_work("no commits on branch yet", Vec::new()),
            MergeStatus::Conflict => Self::needs_work("does not merge cleanly", vec![commits()]),
            MergeStatus::UpToDate => Self {
                class: BadgeClass::None,
                title: Some("already merged".to_string()),
                links: vec![commits()],
            },
            MergeStatus::FastForward => Self {
                class: BadgeClass::PositiveReview,
                title: Some("fast-forward".to_string()),
                links: vec![
                    commits(),
                    BadgeLink {
                        label: "Diff".to_string(),
                        href: urls.expand(&links.range_diff_template),
                    },
                ],
            },
            MergeStatus::Mergeable(_) => Self {
                class: BadgeClass::PositiveReview,
                title: Some("merges cleanly".to_string()),
                links: vec![
                    commits(),
                    BadgeLink {
                        label: "Diff".to_string(),
                        href: urls.expand(&links.preview_diff_template),
                    },
                ],
            },
        }
    }

    /// Badge for an evaluation that failed
    pub fn from_error(error: &EngineError) -> Self {
        Self::needs_work(error.user_message(), Vec::new())
    }
}

struct UrlContext<'a> {
    branch: &'a str,
    reference: &'a str,
    target: &'a str,
    preview: &'a str,
}

impl UrlContext<'_> {
    fn expand(&self, template: &str) -> String {
        template
            .replace("{branch}", self.branch)
            .replace("{reference}", self.reference)
            .replace("{target}", self.target)
            .replace("{preview}", self.preview)
    }
}
