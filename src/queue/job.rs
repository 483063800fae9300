// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! A unit of batch work: one operation against one repository.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GitError;
use crate::git::options::DEFAULT_REMOTE;
use crate::git::{Credentials, Executor, FetchOptions, MergeOptions, PullOptions};
use crate::repository::{RepoId, Repository};

/// Batch operation type.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Fetch,
    Pull,
    Merge,
}

impl JobKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Pull => "pull",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a job: at most one per (repository, kind) in a queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobKey {
    pub repo: RepoId,
    pub kind: JobKind,
    /// Repository display name, for reports.
    pub name: String,
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// Operation-specific options.
#[derive(Debug, Clone)]
pub enum JobOptions {
    Fetch(FetchOptions),
    Pull(PullOptions),
    Merge(MergeOptions),
}

impl JobOptions {
    #[must_use]
    pub const fn kind(&self) -> JobKind {
        match self {
            Self::Fetch(_) => JobKind::Fetch,
            Self::Pull(_) => JobKind::Pull,
            Self::Merge(_) => JobKind::Merge,
        }
    }
}

/// Binds an operation and its options to a repository.
#[derive(Debug, Clone)]
pub struct Job {
    repo: Arc<Repository>,
    options: JobOptions,
}

impl Job {
    /// Job with default options, targeting the repository's active remote.
    #[must_use]
    pub fn new(kind: JobKind, repo: Arc<Repository>) -> Self {
        Self::with_fallback_remote(kind, repo, DEFAULT_REMOTE)
    }

    /// Like [`Job::new`], with `fallback` used when the repository has no
    /// remote selected.
    #[must_use]
    pub fn with_fallback_remote(kind: JobKind, repo: Arc<Repository>, fallback: &str) -> Self {
        let remote = repo
            .state()
            .remote
            .map_or_else(|| fallback.to_string(), |r| r.name);
        let options = match kind {
            JobKind::Fetch => JobOptions::Fetch(FetchOptions::builder().with_remote(remote).build()),
            JobKind::Pull => JobOptions::Pull(PullOptions::builder().with_remote(remote).build()),
            JobKind::Merge => JobOptions::Merge(MergeOptions::default()),
        };
        Self { repo, options }
    }

    #[must_use]
    pub const fn with_options(repo: Arc<Repository>, options: JobOptions) -> Self {
        Self { repo, options }
    }

    #[must_use]
    pub const fn kind(&self) -> JobKind {
        self.options.kind()
    }

    #[must_use]
    pub const fn repository(&self) -> &Arc<Repository> {
        &self.repo
    }

    #[must_use]
    pub const fn options(&self) -> &JobOptions {
        &self.options
    }

    #[must_use]
    pub fn key(&self) -> JobKey {
        JobKey {
            repo: self.repo.id(),
            kind: self.kind(),
            name: self.repo.name().to_string(),
        }
    }

    /// Attaches credentials; merges take none and are returned unchanged.
    #[must_use]
    pub fn with_credentials(self, credentials: Credentials) -> Self {
        let options = match self.options {
            JobOptions::Fetch(opts) => JobOptions::Fetch(opts.set_credentials(Some(credentials))),
            JobOptions::Pull(opts) => JobOptions::Pull(opts.set_credentials(Some(credentials))),
            merge @ JobOptions::Merge(_) => merge,
        };
        Self {
            repo: self.repo,
            options,
        }
    }

    /// Runs the operation synchronously.
    ///
    /// # Errors
    ///
    /// Returns the executor's classified `GitError`.
    pub fn run(&self, executor: &Executor) -> Result<(), GitError> {
        match &self.options {
            JobOptions::Fetch(opts) => executor.fetch(&self.repo, opts),
            JobOptions::Pull(opts) => executor.pull(&self.repo, opts),
            JobOptions::Merge(opts) => executor.merge(&self.repo, opts),
        }
    }
}
