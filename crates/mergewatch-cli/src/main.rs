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

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::*;
use mergewatch_config::{Config, ConfigLoader, DEFAULT_CONFIG_FILE};
use mergewatch_observability::{init_tracing_with_config, LogConfig, LogFormat};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mergewatch")]
#[command(version, about = "Merge status and changelogs for ticket branches")]
#[command(
    long_about = "mergewatch tells whether a ticket's branch merges cleanly into the reference branch,
keeps a stable preview merge commit for clean merges, and writes changelog text for new commits."
)]
#[command(propagate_version = true)]
#[command(author = "Mergewatch Contributors")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./mergewatch.toml, then MERGEWATCH_* variables)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output (repeat for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Colored output (always|auto|never)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate how branches merge into the reference branch
    Status(StatusCmd),

    /// Print changelog text for commits new on a branch
    Changelog(ChangelogCmd),

    /// Point a ticket's symbolic ref at its branch
    #[command(name = "ticket-ref")]
    TicketRef(TicketRefCmd),

    /// Inspect or clear the merge status cache
    #[command(subcommand)]
    Cache(CacheCmd),

    /// Check branch names against the reference naming rules
    #[command(name = "check-name")]
    CheckName(CheckNameCmd),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    fn needs_config(&self) -> bool {
        matches!(
            self,
            Commands::Status(_) | Commands::Changelog(_) | Commands::TicketRef(_) | Commands::Cache(_)
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.color.as_str() {
        "never" => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }
        "always" => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        }
        "auto" => {}
        _ => {
            output::error(&format!("Invalid color option: {}", cli.color));
            std::process::exit(1);
        }
    }

    let result = run(cli).await;

    if let Err(e) = result {
        output::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = if cli.command.needs_config() {
        Some(load_config(cli.config.as_deref()).await?)
    } else {
        None
    };

    let mut log_config = LogConfig::new().with_color(console::colors_enabled_stderr());
    if let Some(config) = &config {
        log_config = log_config
            .with_format(config.observability.log_format.parse::<LogFormat>()?)
            .with_level(config.observability.log_level.clone());
    } else {
        log_config = log_config.with_format(LogFormat::Compact).with_level("warn");
    }
    // Already installed is fine
    init_tracing_with_config(log_config.with_verbosity(cli.verbose, cli.quiet)).ok();

    match (cli.command, config) {
        (Commands::Status(cmd), Some(config)) => cmd.execute(&config).await,
        (Commands::Changelog(cmd), Some(config)) => cmd.execute(&config).await,
        (Commands::TicketRef(cmd), Some(config)) => cmd.execute(&config).await,
        (Commands::Cache(cmd), Some(config)) => cmd.execute(&config).await,
        (Commands::CheckName(cmd), _) => cmd.execute(),
        (Commands::Version, _) => {
            print_version();
            Ok(())
        }
        (Commands::Completions { shell }, _) => {
            generate_completions(shell);
            Ok(())
        }
        (_, None) => anyhow::bail!("configuration was not loaded"),
    }
}

/// An explicit `--config` must exist; otherwise `./mergewatch.toml` is used
/// when present and the environment alone when it is not.
async fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => ConfigLoader::new()
            .load_with_overrides(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Config::load(DEFAULT_CONFIG_FILE)
            .await
            .context("Failed to load configuration"),
    }
}

fn print_version() {
    println!("mergewatch {}", env!("CARGO_PKG_VERSION"));
    println!("rust-version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("license: {}", env!("CARGO_PKG_LICENSE"));
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "mergewatch", &mut io::stdout());
}
