// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Lists discovered repositories with their branch and divergence.

use super::{RepositoryLine, Workspace, name_width};
use crate::config::Config;
use crate::error::Result;

/// Scans and returns one line per repository.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened.
pub fn list_repositories(config: &Config) -> Result<Vec<RepositoryLine>> {
    let workspace = Workspace::open(config)?;
    Ok(workspace
        .repositories
        .iter()
        .map(|repo| RepositoryLine::from_repository(repo))
        .collect())
}

/// # Errors
///
/// Returns an error if the workspace cannot be opened or output fails.
pub fn run_list_command(config: &Config, json: bool) -> Result<()> {
    let lines = list_repositories(config)?;

    if json {
        for line in &lines {
            println!("{}", line.to_json()?);
        }
    } else if lines.is_empty() {
        println!("No repositories found");
    } else {
        let width = name_width(&lines);
        for line in &lines {
            println!("{}", line.branch_row(width));
        }
    }
    Ok(())
}
