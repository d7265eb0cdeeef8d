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
use clap::{Parser, Subcommand};
use mergewatch_config::Config;
use mergewatch_engine::MergeStatusCache;
use serde_json::json;

/// Inspect or clear the merge status cache
#[derive(Subcommand, Debug)]
pub enum CacheCmd {
    /// List cached statuses
    #[command(alias = "ls")]
    Show(ShowOpts),

    /// Drop every cached status
    Clear,
}

#[derive(Parser, Debug)]
pub struct ShowOpts {
    /// Print entries as JSON
    #[arg(long)]
    pub json: bool,
}

impl CacheCmd {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let cache = MergeStatusCache::connect(&config.cache.database_path)
            .await
            .with_context(|| format!("Failed to open cache at {}", config.cache.database_path))?;

        match self {
            CacheCmd::Show(opts) => show(&cache, opts.json).await,
            CacheCmd::Clear => {
                let count = cache.len().await?;
                cache.clear().await?;
                output::success(&format!("Cleared {} cached statuses", count));
                Ok(())
            }
        }
    }
}

async fn show(cache: &MergeStatusCache, as_json: bool) -> Result<()> {
    let entries = cache.entries().await?;

    if as_json {
        let rows: Vec<_> = entries
            .iter()
            .map(|entry| {
                json!({
                    "branch": entry.branch,
                    "status": entry.status.kind(),
                    "preview": entry.status.preview(),
                    "reference": entry.reference,
                    "target": entry.target,
                    "computed_at": entry.computed_at.to_rfc3339(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if entries.is_empty() {
        output::info("Cache is empty");
        return Ok(());
    }

    output::header(&format!("{} cached statuses", entries.len()));
    for entry in &entries {
        println!(
            "  {:<30} {:<12} {}..{}  {}",
            entry.branch,
            entry.status.kind(),
            entry.reference.short(),
            entry.target.short(),
            entry.computed_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}
