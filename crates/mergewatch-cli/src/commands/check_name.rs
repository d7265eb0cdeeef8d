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
use anyhow::Result;
use clap::Parser;
use mergewatch_git::refname;

/// Check branch names against the reference naming rules
#[derive(Parser, Debug)]
pub struct CheckNameCmd {
    /// Names to check
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,
}

impl CheckNameCmd {
    pub fn execute(&self) -> Result<()> {
        let mut invalid = 0usize;
        for name in &self.names {
            match refname::validate(name) {
                Ok(()) => output::success(&format!("{:?} is a valid branch name", name)),
                Err(violation) => {
                    invalid += 1;
                    output::warning(&format!("{:?} is invalid: {}", name, violation));
                }
            }
        }

        if invalid > 0 {
            anyhow::bail!("{} of {} names are invalid", invalid, self.names.len());
        }
        Ok(())
    }
}
