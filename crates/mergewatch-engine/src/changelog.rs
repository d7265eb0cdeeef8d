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

//! Changelog text for commits new to a branch

use crate::error::EngineResult;
use mergewatch_git::{CommitId, GitError, VcsGateway};
use tracing::{debug, warn};

/// Default number of commits listed in a changelog block
pub const MAX_NEW_COMMITS: usize = 10;

/// One changelog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Abbreviated commit id
    pub short_id: String,
    /// Full commit id
    pub id: CommitId,
    /// Deep link to the commit
    pub link: String,
    /// First line of the commit message, possibly empty
    pub title: String,
}

impl LogEntry {
    /// Wiki table row: `||[<link> <short>]||{{{<title>}}}||`
    pub fn render(&self) -> String {
        format!("||[{} {}]||{{{{{{{}}}}}}}||", self.link, self.short_id, self.title)
    }
}

/// Something whose ancestors are excluded from a log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreItem {
    /// A commit and its ancestors
    Commit(CommitId),
    /// The tip of a branch and its ancestors; skipped if it does not resolve
    Branch(String),
}

/// Builds bounded, oldest-first commit logs
pub struct CommitLogBuilder<'a> {
    gateway: &'a dyn VcsGateway,
    link_template: &'a str,
}

impl<'a> CommitLogBuilder<'a> {
    /// `link_template` has its `{id}` placeholder replaced by each full id
    pub fn new(gateway: &'a dyn VcsGateway, link_template: &'a str) -> Self {
        Self {
            gateway,
            link_template,
        }
    }

    /// Commits reachable from `from` and from nothing in `ignore`, oldest
    /// first. With a `limit`, only the newest `limit` commits are kept.
    pub fn build_log(
        &self,
        from: &CommitId,
        ignore: &[IgnoreItem],
        limit: Option<usize>,
    ) -> EngineResult<Vec<LogEntry>> {
        let mut excluding = Vec::with_capacity(ignore.len());
        for item in ignore {
            match item {
                IgnoreItem::Commit(id) => excluding.push(id.clone()),
                IgnoreItem::Branch(name) => match self.gateway.resolve_branch(name) {
                    Ok(id) => excluding.push(id),
                    Err(GitError::BranchNotFound(_)) | Err(GitError::InvalidRefName { .. }) => {
                        warn!(branch = %name, "Ignored branch does not resolve; not excluding it");
                    }
                    Err(e) => return Err(e.into()),
                },
            }
        }

        let mut walked = self.gateway.log_ancestors(from, &excluding, limit)?;
        debug!(from = %from, commits = walked.len(), "Walked new commits");
        walked.reverse();

        walked
            .into_iter()
            .map(|id| {
                let message = self.gateway.commit_message(&id)?;
                Ok(LogEntry {
                    short_id: id.short().to_string(),
                    link: self.link_template.replace("{id}", id.as_str()),
                    title: first_line(&message).to_string(),
                    id,
                })
            })
            .collect()
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("").trim_end()
}

/// Renders a changelog block from oldest-first entries.
///
/// Callers fetch up to `max + 1` entries; more than `max` means the list was
/// cut and only the newest `max` are shown.
pub fn render_changelog(entries: &[LogEntry], max: usize) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let (header, shown) = if entries.len() > max {
        (
            format!("Last {} new commits:", max),
            &entries[entries.len() - max..],
        )
    } else {
        ("New commits:".to_string(), entries)
    };

    let mut text = header;
    for entry in shown {
        text.push('\n');
        text.push_str(&entry.render());
    }
    Some(text)
}
