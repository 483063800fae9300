// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! NativeGit   (in-process)  --> GixBackend   (pure Rust gix)
//! ExternalGit (subprocess)  --> ShellBackend (git CLI, combined output)
//! ```
//!
//! The executor holds one of each and decides per call which to use.

mod native;
mod shell;


pub use self::native::GixBackend;
pub use self::shell::ShellBackend;

use std::path::Path;

use thiserror::Error;

use crate::error::{ErrorKind, GitError, ProcessError};
use crate::git::auth::Credentials;
use crate::git::classify::classify;
use crate::repository::model::RepoSnapshot;

/// Successful native outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeOutcome {
    /// References or the working tree changed.
    Updated,
    /// Nothing to do.
    UpToDate,
}

/// Failure reported by a native backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
    #[error("authentication required")]
    AuthenticationRequired,

    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// No usable SSH agent in the environment.
    #[error("ssh agent unavailable: {0}")]
    SshAgentMissing(String),

    /// The computed refspec matched nothing on the remote.
    #[error("couldn't find remote ref: {0}")]
    RemoteRefNotFound(String),

    /// A reference expected in the local snapshot is missing.
    #[error("reference not found: {0}")]
    StaleReference(String),

    /// The backend does not implement the operation or option.
    #[error("not supported natively: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Other(String),
}

impl NativeError {
    /// Maps to the executor's classified error.
    #[must_use]
    pub fn into_git_error(self) -> GitError {
        let kind = match &self {
            Self::AuthenticationRequired => ErrorKind::AuthenticationRequired,
            Self::AuthorizationFailed(_) => ErrorKind::AuthorizationFailed,
            Self::RemoteRefNotFound(_) => ErrorKind::CouldNotFindRemoteRef,
            Self::StaleReference(_) => ErrorKind::ReferenceBroken,
            Self::SshAgentMissing(_) | Self::Unsupported(_) => ErrorKind::GitCommandFailed,
            Self::Other(text) => classify(text),
        };
        GitError::new(kind, self.to_string())
    }
}

/// Native fetch parameters.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub remote: String,
    /// Refspec to fetch instead of the configured ones.
    pub refspec: String,
    pub credentials: Option<Credentials>,
}

/// Native pull parameters.
#[derive(Debug, Clone)]
pub struct PullRequest {
    pub remote: String,
    /// Branch name on the remote.
    pub branch: String,
    pub refspec: String,
    pub credentials: Option<Credentials>,
}

/// In-process repository access.
///
/// Operations a backend cannot perform report [`NativeError::Unsupported`],
/// which the executor treats as a reason to use the external strategy.
pub trait NativeGit: Send + Sync {
    /// Reads branches, remotes, HEAD commit and stashes.
    ///
    /// # Errors
    ///
    /// Returns a `NativeError` if the repository cannot be opened or read.
    fn snapshot(&self, repo: &Path) -> Result<RepoSnapshot, NativeError>;

    /// Fetches `request.refspec` from `request.remote`.
    ///
    /// # Errors
    ///
    /// Returns a `NativeError` describing why the fetch failed.
    fn fetch(&self, repo: &Path, request: &FetchRequest) -> Result<NativeOutcome, NativeError>;

    /// Fetches and integrates the remote branch into HEAD.
    ///
    /// # Errors
    ///
    /// Returns a `NativeError` describing why the pull failed.
    fn pull(&self, repo: &Path, request: &PullRequest) -> Result<NativeOutcome, NativeError>;

    /// Merges `branch` into HEAD.
    ///
    /// # Errors
    ///
    /// Returns a `NativeError` describing why the merge failed.
    fn merge(&self, repo: &Path, branch: &str) -> Result<NativeOutcome, NativeError>;

    /// Paths with staged, unstaged, or untracked changes.
    ///
    /// # Errors
    ///
    /// Returns a `NativeError` if the status cannot be computed.
    fn status(&self, repo: &Path) -> Result<Vec<String>, NativeError>;

    /// Reads a configuration value.
    ///
    /// # Errors
    ///
    /// Returns a `NativeError` if the configuration cannot be read.
    fn config_get(&self, repo: &Path, key: &str) -> Result<Option<String>, NativeError>;

    /// Stages `pathspecs`.
    ///
    /// # Errors
    ///
    /// Returns `NativeError::Unsupported` unless the backend implements staging.
    fn add(&self, _repo: &Path, _pathspecs: &[String]) -> Result<(), NativeError> {
        Err(NativeError::Unsupported("add".to_string()))
    }
}

/// Exit status and interleaved stdout/stderr of an external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` if terminated by a signal.
    pub code: Option<i32>,
    /// Stdout followed by stderr.
    pub output: String,
}

impl CommandOutput {
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Subprocess-based git execution.
pub trait ExternalGit: Send + Sync {
    /// Runs git with `args` in `cwd` and captures combined output.
    ///
    /// A non-zero exit is not an error here; callers inspect the output.
    ///
    /// # Errors
    ///
    /// Returns a `ProcessError` if the process cannot be started.
    fn run(&self, cwd: &Path, args: &[String]) -> Result<CommandOutput, ProcessError>;
}
