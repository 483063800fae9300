// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Quick mode: one operation on every discovered repository.

use tracing::{debug, warn};

use super::progress::BatchProgress;
use super::{RepositoryLine, Workspace, name_width};
use crate::config::Config;
use crate::error::Result;
use crate::queue::{BatchReport, Job, JobKind, Scheduler};

/// Enqueues `kind` for every repository and runs the batch.
///
/// Returns the report together with one line per repository, in scan order.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened.
pub async fn run_batch(
    kind: JobKind,
    config: &Config,
    show_progress: bool,
) -> Result<(BatchReport, Vec<RepositoryLine>)> {
    let workspace = Workspace::open(config)?;
    let Workspace {
        executor,
        events,
        repositories,
    } = workspace;

    let scheduler = match config.jobs.concurrency {
        Some(n) => Scheduler::with_concurrency(executor, n),
        None => Scheduler::new(executor),
    };
    for repo in &repositories {
        let job = Job::with_fallback_remote(kind, repo.clone(), &config.git.default_remote);
        if let Err(e) = scheduler.add_job(job) {
            warn!(repo = %repo.name(), error = %e, "not queued");
        }
    }

    let progress = BatchProgress::start(&events, scheduler.queue().len(), !show_progress);
    let report = scheduler.start_jobs().await;
    let completed = progress.finish().await;
    debug!(completed, "progress closed");

    let lines = repositories
        .iter()
        .map(|repo| RepositoryLine::from_repository(repo))
        .collect();
    Ok((report, lines))
}

/// Runs quick mode and prints the per-repository results.
///
/// Returns `true` when every job succeeded.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened or output fails.
pub async fn run_batch_command(kind: JobKind, config: &Config, json: bool) -> Result<bool> {
    let (report, lines) = run_batch(kind, config, !json).await?;

    if json {
        for line in &lines {
            println!("{}", line.to_json()?);
        }
    } else if lines.is_empty() {
        println!("No repositories found");
    } else {
        let width = name_width(&lines);
        for line in &lines {
            println!("{}", line.status_row(width));
        }
    }

    if let Some(reason) = &report.interrupted {
        eprintln!("Batch interrupted: {reason}");
    }
    Ok(report.is_clean())
}
