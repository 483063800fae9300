// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Job queue and batch scheduler.
//!
//! ```text
//! add_job ---> primary JobQueue --start_jobs--> Semaphore(N) --> tokio tasks
//!                 ^                                                  |
//!                 | resubmit(credentials)              auth required |
//!                 |                                                  v
//!              failover JobQueue <---------------------------- Paused
//! ```
//!
//! A queue holds at most one job per (repository, kind). Order carries no
//! meaning; jobs are independent.

mod job;
mod scheduler;

#[cfg(test)]
mod tests;

pub use job::{Job, JobKey, JobKind, JobOptions};
pub use scheduler::{BatchReport, Scheduler};

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::QueueError;
use crate::git::Credentials;
use crate::repository::RepoId;

/// Ordered set of pending jobs guarded by a single lock.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: Mutex<Vec<Job>>,
}

impl JobQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts `job`.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::AlreadyQueued` if a job of the same kind exists
    /// for the repository; the queue is left unchanged.
    pub fn add(&self, job: Job) -> Result<(), QueueError> {
        let mut jobs = self.lock();
        let (repo, kind) = (job.repository().id(), job.kind());
        if jobs
            .iter()
            .any(|j| j.repository().id() == repo && j.kind() == kind)
        {
            return Err(QueueError::AlreadyQueued {
                repo: job.repository().name().to_string(),
                operation: kind.to_string(),
            });
        }
        jobs.push(job);
        Ok(())
    }

    /// Removes every job for `repo`.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::NotInQueue` if there was none.
    pub fn remove(&self, repo: RepoId, name: &str) -> Result<Vec<Job>, QueueError> {
        let mut jobs = self.lock();
        let (removed, kept): (Vec<Job>, Vec<Job>) =
            jobs.drain(..).partition(|j| j.repository().id() == repo);
        *jobs = kept;
        if removed.is_empty() {
            Err(QueueError::NotInQueue {
                repo: name.to_string(),
            })
        } else {
            Ok(removed)
        }
    }

    /// Removes the job identified by `key`, if present.
    pub fn remove_key(&self, key: &JobKey) -> Option<Job> {
        let mut jobs = self.lock();
        let index = jobs
            .iter()
            .position(|j| j.repository().id() == key.repo && j.kind() == key.kind)?;
        Some(jobs.remove(index))
    }

    /// Inserts `job` with `credentials` attached. When a job of the same
    /// kind is already queued for the repository, the credentials go onto
    /// that job instead and `job` is dropped.
    ///
    /// Returns `true` if an existing job was updated.
    pub fn add_with_credentials(&self, job: Job, credentials: &Credentials) -> bool {
        let mut jobs = self.lock();
        let (repo, kind) = (job.repository().id(), job.kind());
        match jobs
            .iter()
            .position(|j| j.repository().id() == repo && j.kind() == kind)
        {
            Some(index) => {
                let existing = jobs.remove(index);
                jobs.insert(index, existing.with_credentials(credentials.clone()));
                true
            }
            None => {
                jobs.push(job.with_credentials(credentials.clone()));
                false
            }
        }
    }

    /// First job referencing `repo`, if any.
    #[must_use]
    pub fn find(&self, repo: RepoId) -> Option<Job> {
        self.lock()
            .iter()
            .find(|j| j.repository().id() == repo)
            .cloned()
    }

    #[must_use]
    pub fn contains(&self, repo: RepoId) -> bool {
        self.lock().iter().any(|j| j.repository().id() == repo)
    }

    /// Takes every job out of the queue.
    #[must_use]
    pub fn drain(&self) -> Vec<Job> {
        std::mem::take(&mut *self.lock())
    }

    #[must_use]
    pub fn keys(&self) -> Vec<JobKey> {
        self.lock().iter().map(Job::key).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
