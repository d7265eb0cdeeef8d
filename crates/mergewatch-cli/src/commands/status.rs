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
use mergewatch_engine::{BadgeClass, BranchBadge, BranchIntegrationService, Evaluation};
use serde::Serialize;

/// Evaluate how branches merge into the reference branch
#[derive(Parser, Debug)]
pub struct StatusCmd {
    /// Branch names to evaluate
    #[arg(value_name = "BRANCH", required = true)]
    pub branches: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct BranchReport {
    branch: String,
    status: &'static str,
    summary: String,
    reference: Option<String>,
    target: Option<String>,
    preview: Option<String>,
    badge: BranchBadge,
}

impl BranchReport {
    fn evaluated(branch: &str, evaluation: &Evaluation, badge: BranchBadge) -> Self {
        Self {
            branch: branch.to_string(),
            status: evaluation.status.kind(),
            summary: evaluation.status.to_string(),
            reference: Some(evaluation.reference.to_string()),
            target: evaluation.target.as_ref().map(ToString::to_string),
            preview: evaluation.status.preview().map(ToString::to_string),
            badge,
        }
    }

    fn failed(branch: &str, message: String, badge: BranchBadge) -> Self {
        Self {
            branch: branch.to_string(),
            status: "error",
            summary: message,
            reference: None,
            target: None,
            preview: None,
            badge,
        }
    }

    fn print(&self) {
        output::header(&self.branch);
        let title = self.badge.title.as_deref().unwrap_or(&self.summary);
        match self.badge.class {
            BadgeClass::PositiveReview => output::success(title),
            BadgeClass::NeedsWork => output::warning(title),
            BadgeClass::None => output::info(title),
        }
        if let Some(target) = &self.target {
            output::detail("Commit", target);
        }
        if let Some(preview) = &self.preview {
            output::detail("Preview", preview);
        }
        for link in &self.badge.links {
            output::detail(&link.label, &link.href);
        }
    }
}

impl StatusCmd {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let service = BranchIntegrationService::from_config(config)
            .await
            .context("Failed to open repository or status cache")?;

        let mut reports = Vec::with_capacity(self.branches.len());
        let mut failures = 0usize;

        for branch in &self.branches {
            match service.evaluate_branch_detailed(branch).await {
                Ok(evaluation) => {
                    let badge = BranchBadge::from_evaluation(&evaluation, branch, &config.links);
                    reports.push(BranchReport::evaluated(branch, &evaluation, badge));
                }
                Err(e) => {
                    tracing::error!(branch = %branch, error = %e, "Evaluation failed");
                    failures += 1;
                    reports.push(BranchReport::failed(
                        branch,
                        e.to_string(),
                        BranchBadge::from_error(&e),
                    ));
                }
            }
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        } else {
            for report in &reports {
                report.print();
            }
        }

        if failures > 0 {
            anyhow::bail!(
                "{} of {} branches could not be evaluated",
                failures,
                self.branches.len()
            );
        }
        Ok(())
    }
}
