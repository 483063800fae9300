// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bounded-concurrency batch runner.
//!
//! ```text
//! start_jobs().await
//!   drain primary queue
//!   per job: acquire slot --> spawn
//!              lock repository (one operation at a time)
//!              Queued --> Working
//!              spawn_blocking(executor)
//!              Working --> Success | Fail(message) | Paused
//!   join all --> BatchReport { succeeded, failed, paused, unscheduled }
//!   paused jobs --> failover queue
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::{Job, JobKey, JobQueue};
use crate::error::{ErrorKind, GitError, QueueError};
use crate::git::{Credentials, Executor};
use crate::repository::Repository;
use crate::repository::status::WorkStatus;

/// Outcome of one `start_jobs` run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Failed jobs with their classified error.
    pub failed: BTreeMap<JobKey, GitError>,
    /// Jobs that need credentials; now in the failover queue.
    pub paused: Vec<JobKey>,
    pub succeeded: Vec<JobKey>,
    /// Jobs left in the primary queue because no slot could be obtained.
    pub unscheduled: Vec<JobKey>,
    /// Why scheduling stopped early, if it did.
    pub interrupted: Option<QueueError>,
}

impl BatchReport {
    /// Whether every job succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.paused.is_empty() && self.unscheduled.is_empty()
    }

    /// Number of jobs that ran.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.failed.len() + self.paused.len() + self.succeeded.len()
    }
}

enum JobResult {
    Succeeded,
    Paused(GitError),
    Failed(GitError),
}

/// Runs queued jobs with bounded parallelism.
#[derive(Debug)]
pub struct Scheduler {
    executor: Arc<Executor>,
    queue: JobQueue,
    failover: JobQueue,
    slots: Arc<Semaphore>,
    concurrency: usize,
}

impl Scheduler {
    /// One slot per available processing unit.
    #[must_use]
    pub fn new(executor: Executor) -> Self {
        let max_concurrent = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(4);
        Self::with_concurrency(executor, max_concurrent)
    }

    /// Explicit slot count (at least one).
    #[must_use]
    pub fn with_concurrency(executor: Executor, max_concurrent: usize) -> Self {
        let concurrency = max_concurrent.max(1);
        Self {
            executor: Arc::new(executor),
            queue: JobQueue::new(),
            failover: JobQueue::new(),
            slots: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[must_use]
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Jobs waiting to run.
    #[must_use]
    pub const fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Jobs paused on authentication.
    #[must_use]
    pub const fn failover(&self) -> &JobQueue {
        &self.failover
    }

    /// Enqueues `job` and marks its repository `Queued`.
    ///
    /// A repository already queued or working for another kind keeps its
    /// status.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::AlreadyQueued` for a duplicate (repository, kind).
    pub fn add_job(&self, job: Job) -> Result<(), QueueError> {
        let repo = Arc::clone(job.repository());
        let key = job.key();
        self.queue.add(job)?;

        match repo.transition(WorkStatus::Queued, None) {
            Ok(()) => {}
            Err(_) if repo.status().is_busy() => {}
            Err(e) => {
                if self.queue.remove_key(&key).is_none() {
                    warn!(job = %key, "queued job vanished before rollback");
                }
                return Err(e);
            }
        }
        let kind = key.kind;
        debug!(repo = %repo.name(), operation = %kind, "job queued");
        Ok(())
    }

    /// Removes all of `repo`'s jobs from the primary queue.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::NotInQueue` if the repository has no queued job.
    pub fn remove_from_queue(&self, repo: &Repository) -> Result<(), QueueError> {
        self.queue.remove(repo.id(), repo.name())?;
        if repo.status() == WorkStatus::Queued {
            repo.transition(WorkStatus::Available, None)?;
        }
        Ok(())
    }

    /// The queued job for `repo`, if any.
    #[must_use]
    pub fn is_in_the_queue(&self, repo: &Repository) -> Option<Job> {
        self.queue.find(repo.id())
    }

    /// Moves `repo`'s paused jobs back to the primary queue with
    /// `credentials` attached.
    ///
    /// A job of the same kind that was queued again in the meantime keeps
    /// its place and receives the credentials. A repository that is already
    /// queued or working keeps its status.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::NotInQueue` if the repository is not in the
    /// failover queue; nothing is changed in that case.
    pub fn resubmit(&self, repo: &Repository, credentials: &Credentials) -> Result<(), QueueError> {
        let jobs = self.failover.remove(repo.id(), repo.name())?;
        for job in jobs {
            let key = job.key();
            if self.queue.add_with_credentials(job, credentials) {
                debug!(job = %key, "credentials attached to queued job");
            }
        }

        if !repo.status().is_busy() {
            match repo.transition(WorkStatus::Queued, None) {
                Ok(()) => {}
                Err(_) if repo.status().is_busy() => {}
                Err(e) => {
                    warn!(repo = %repo.name(), error = %e, "resubmitted job left in previous status");
                }
            }
        }
        info!(repo = %repo.name(), "resubmitted with credentials");
        Ok(())
    }

    /// Closes the slot pool. Later batches cannot schedule anything and
    /// leave their jobs queued.
    pub fn close(&self) {
        self.slots.close();
    }

    /// Runs every queued job and waits for all of them.
    pub async fn start_jobs(&self) -> BatchReport {
        let mut report = BatchReport::default();
        let mut pending = self.queue.drain().into_iter();
        let mut handles = Vec::new();

        info!(jobs = pending.len(), concurrency = self.concurrency, "starting batch");

        while let Some(job) = pending.next() {
            let permit = match Arc::clone(&self.slots).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    warn!(error = %e, "no concurrency slot, leaving remaining jobs queued");
                    report.interrupted = Some(QueueError::SlotUnavailable(e.to_string()));
                    for job in std::iter::once(job).chain(pending.by_ref()) {
                        report.unscheduled.push(job.key());
                        if let Err(e) = self.queue.add(job) {
                            debug!(error = %e, "job re-added concurrently");
                        }
                    }
                    break;
                }
            };

            let executor = Arc::clone(&self.executor);
            let key = job.key();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = run_job(executor, job.clone()).await;
                (job, result)
            });
            handles.push((key, handle));
        }

        for (key, handle) in handles {
            match handle.await {
                Ok((_, JobResult::Succeeded)) => report.succeeded.push(key),
                Ok((job, JobResult::Paused(e))) => {
                    debug!(job = %key, error = %e, "moving to failover queue");
                    if let Err(e) = self.failover.add(job) {
                        debug!(job = %key, error = %e, "already in failover queue");
                    }
                    report.paused.push(key);
                }
                Ok((_, JobResult::Failed(e))) => {
                    report.failed.insert(key, e);
                }
                Err(e) => {
                    warn!(job = %key, error = %e, "job task aborted");
                    report
                        .failed
                        .insert(key, GitError::new(ErrorKind::GitCommandFailed, e.to_string()));
                }
            }
        }

        report.succeeded.sort();
        report.paused.sort();
        report.unscheduled.sort();
        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            paused = report.paused.len(),
            unscheduled = report.unscheduled.len(),
            "batch finished"
        );
        report
    }
}

async fn run_job(executor: Arc<Executor>, job: Job) -> JobResult {
    let repo = Arc::clone(job.repository());
    let lock = repo.operation_lock();
    let _guard = lock.lock().await;

    // A job for another kind may have finished on this repository while
    // this one waited; re-enter Queued before starting.
    if repo.status() != WorkStatus::Queued
        && let Err(e) = repo.transition(WorkStatus::Queued, None)
    {
        debug!(repo = %repo.name(), error = %e, "cannot re-enter queued");
    }
    if let Err(e) = repo.transition(WorkStatus::Working, None) {
        warn!(repo = %repo.name(), error = %e, "cannot start job");
        return JobResult::Failed(GitError::new(ErrorKind::GitCommandFailed, e.to_string()));
    }
    debug!(repo = %repo.name(), operation = %job.kind(), "job started");

    let result = tokio::task::spawn_blocking(move || job.run(&executor))
        .await
        .unwrap_or_else(|e| Err(GitError::new(ErrorKind::GitCommandFailed, e.to_string())));

    let (status, message, outcome) = match result {
        Ok(()) => (WorkStatus::Success, None, JobResult::Succeeded),
        Err(e) if e.is_auth_required() => (
            WorkStatus::Paused,
            Some(e.kind().message().to_string()),
            JobResult::Paused(e),
        ),
        Err(e) => {
            warn!(repo = %repo.name(), error = %e, "job failed");
            (
                WorkStatus::Fail,
                Some(e.kind().message().to_string()),
                JobResult::Failed(e),
            )
        }
    };
    if let Err(e) = repo.transition(status, message) {
        warn!(repo = %repo.name(), error = %e, "cannot record job outcome");
    }
    outcome
}
