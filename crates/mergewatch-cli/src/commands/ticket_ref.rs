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
use mergewatch_engine::{BranchIntegrationService, TicketRefUpdate};

/// Point a ticket's symbolic ref at its branch
///
/// Without BRANCH, or when BRANCH does not resolve, the ticket ref is removed.
#[derive(Parser, Debug)]
pub struct TicketRefCmd {
    /// Ticket number
    #[arg(value_name = "TICKET")]
    pub ticket_id: u64,

    /// Branch named in the ticket's branch field
    #[arg(value_name = "BRANCH")]
    pub branch: Option<String>,
}

impl TicketRefCmd {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let service = BranchIntegrationService::from_config(config)
            .await
            .context("Failed to open repository or status cache")?;

        if let Some(branch) = &self.branch {
            let fields = service.normalize_ticket_branch(branch).await?;
            if !fields.commit.is_empty() {
                output::detail("Commit", &fields.commit);
            }
        }

        let update = service
            .sync_ticket_ref(self.ticket_id, self.branch.as_deref())
            .await
            .with_context(|| format!("Failed to update ref for ticket #{}", self.ticket_id))?;

        match update {
            TicketRefUpdate::Disabled => output::warning(
                "Ticket refs are disabled; set repository.maintain_ticket_refs = true",
            ),
            TicketRefUpdate::Pointed { name, target } => {
                output::success(&format!("{} -> {}", name, target))
            }
            TicketRefUpdate::Removed { name } => output::success(&format!("Removed {}", name)),
            TicketRefUpdate::Absent { name } => output::info(&format!("{} does not exist", name)),
        }
        Ok(())
    }
}
