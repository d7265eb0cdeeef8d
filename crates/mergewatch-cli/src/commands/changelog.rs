// Mergewatch - branch merge-status engine
// Copyright (C) 2026 Mergewatch Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

use crate::output;
use anyhow::{Context, Result};
use clap::Parser;
use mergewatch_config::Config;
use mergewatch_engine::BranchIntegrationService;
use mergewatch_git::CommitId;

/// Print changelog text for commits new on a branch
///
/// Lists commits reachable from BRANCH but not from the reference branch
/// or from the `--old` commit, oldest first.
#[derive(Parser, Debug)]
pub struct ChangelogCmd {
    /// Branch whose new commits are listed
    #[arg(value_name = "BRANCH")]
    pub branch: String,

    /// Commit the ticket's branch field pointed at before
    #[arg(long, value_name = "COMMIT")]
    pub old: Option<String>,
}

impl ChangelogCmd {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let old = self
            .old
            .as_deref()
            .map(CommitId::parse)
            .transpose()
            .context("--old must be a full 40-character commit id")?;

        let service = BranchIntegrationService::from_config(config)
            .await
            .context("Failed to open repository or status cache")?;

        match service
            .on_branch_field_changed(old.as_ref(), &self.branch)
            .await
            .with_context(|| format!("Failed to build changelog for '{}'", self.branch))?
        {
            Some(text) => println!("{}", text),
            None => output::info(&format!("No new commits on '{}'", self.branch)),
        }
        Ok(())
    }
}
