// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   batch (quick mode), list
//!
//! Workspace::open(config)
//!   executor   mode + gix + git program
//!   scan       discover_repositories(roots, depth, follow_links)
//!   load       Repository::open per path (unreadable ones skipped)
//! ```

pub mod batch;
pub mod list;
mod progress;


use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::git::backend::{GixBackend, ShellBackend};
use crate::git::{ExecutionMode, Executor};
use crate::repository::discovery::{discover_repositories, load_repositories};
use crate::repository::events::EventBus;
use crate::repository::Repository;

/// Repositories found by one scan, with the executor that serves them.
#[derive(Debug)]
pub struct Workspace {
    pub executor: Executor,
    pub events: EventBus,
    pub repositories: Vec<Arc<Repository>>,
}

impl Workspace {
    /// Builds the executor and loads every repository under the configured
    /// roots.
    ///
    /// # Errors
    ///
    /// Returns an error if the external mode is forced and the git program
    /// cannot be found.
    pub fn open(config: &Config) -> Result<Self> {
        let executor = build_executor(config)?;
        let events = EventBus::new();

        let paths = discover_repositories(
            &config.scan.roots(),
            config.scan.depth,
            config.scan.follow_links,
        );
        let repositories = load_repositories(&paths, executor.native(), &events);
        info!(
            found = paths.len(),
            loaded = repositories.len(),
            "repositories scanned"
        );

        Ok(Self {
            executor,
            events,
            repositories,
        })
    }
}

/// Resolves the git program once. Without it the native strategy still
/// works and external fallbacks report a spawn failure.
fn build_executor(config: &Config) -> Result<Executor> {
    let mode = config.jobs.mode;
    let shell = match ShellBackend::locate(&config.git.program) {
        Ok(shell) => shell,
        Err(e) if mode == ExecutionMode::External => return Err(e.into()),
        Err(e) => {
            warn!(error = %e, "external fallback unavailable");
            ShellBackend::with_program(&config.git.program)
        }
    };
    Ok(Executor::new(mode, Arc::new(GixBackend), Arc::new(shell)))
}

/// One output row per repository.
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryLine {
    pub name: String,
    pub path: String,
    pub branch: String,
    pub divergence: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RepositoryLine {
    #[must_use]
    pub fn from_repository(repo: &Repository) -> Self {
        let state = repo.state();
        Self {
            name: repo.name().to_string(),
            path: repo.path().display().to_string(),
            branch: state.branch.name.clone(),
            divergence: state.branch.divergence_label(),
            status: state.status.to_string(),
            message: state.message,
        }
    }

    /// `name  status  message`, columns padded to `width`.
    #[must_use]
    pub fn status_row(&self, width: usize) -> String {
        let row = format!("{:<width$}  {:<9}", self.name, self.status);
        match &self.message {
            Some(message) => format!("{row} {message}"),
            None => row.trim_end().to_string(),
        }
    }

    /// `name  branch  divergence`, columns padded to `width`.
    #[must_use]
    pub fn branch_row(&self, width: usize) -> String {
        format!("{:<width$}  {}  {}", self.name, self.branch, self.divergence)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn name_width(lines: &[RepositoryLine]) -> usize {
    lines.iter().map(|l| l.name.chars().count()).max().unwrap_or(0)
}
