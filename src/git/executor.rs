// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command executor: strategy selection and bounded fallback chains.
//!
//! ```text
//! fetch(repo, opts)
//!   credentials on non-http remote ------------------> InvalidAuthMethod
//!   mode External | prune | dry_run -----------------> external
//!   native fetch(+refs/heads/B:refs/remotes/R/B)
//!     ok ------------------------------------------> refresh, Ok
//!     auth required --------------------------------> returned as-is
//!     ssh agent missing    [SSH_AGENT] -------------> external
//!     remote ref not found [REMOTE_REF] ------------> native(first refspec, no budget)
//!     anything else        [FALLBACK] --------------> external
//!
//! pull(repo, opts)
//!     stale reference      [STALE_REF] -------------> fetch, pull again
//!     anything else        [FALLBACK] --------------> external
//!
//! external: run git, refresh (always), classify output on failure
//! ```
//!
//! Each retry consumes its flag from the [`RetryBudget`] handed down the
//! call, so every chain terminates after at most one retry per class.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::auth::{check_auth_method, url_with_credentials};
use super::backend::{
    ExternalGit, FetchRequest, GixBackend, NativeError, NativeGit, NativeOutcome, PullRequest,
    ShellBackend,
};
use super::classify::{classify, is_up_to_date};
use super::options::{
    AddOptions, CommitOptions, FetchOptions, MergeOptions, PullOptions, ResetOptions,
};
use crate::error::{ErrorKind, GitError};
use crate::repository::Repository;
use crate::repository::model::Remote;

/// Strategy policy, fixed when the executor is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Native first, external as bounded fallback.
    #[default]
    Native,
    /// Always the external strategy.
    External,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::External => f.write_str("external"),
        }
    }
}

bitflags! {
    /// Retries still allowed for one operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RetryBudget: u8 {
        /// Missing SSH agent: one external attempt.
        const SSH_AGENT = 0x01;
        /// Computed refspec unknown on the remote: one attempt with the
        /// remote's first refspec.
        const REMOTE_REF = 0x02;
        /// Stale local reference during pull: fetch, then one more pull.
        const STALE_REF = 0x04;
        /// Unrecognized native failure: one external attempt.
        const FALLBACK = 0x08;
    }
}

/// Runs git operations against repositories.
///
/// Holds no per-call state; one instance is shared by all jobs.
#[derive(Clone)]
pub struct Executor {
    mode: ExecutionMode,
    native: Arc<dyn NativeGit>,
    external: Arc<dyn ExternalGit>,
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor").field("mode", &self.mode).finish_non_exhaustive()
    }
}

impl Executor {
    pub fn new(
        mode: ExecutionMode,
        native: Arc<dyn NativeGit>,
        external: Arc<dyn ExternalGit>,
    ) -> Self {
        Self {
            mode,
            native,
            external,
        }
    }

    /// gix for native, `git` from `PATH` for external.
    #[must_use]
    pub fn with_defaults(mode: ExecutionMode) -> Self {
        Self::new(mode, Arc::new(GixBackend), Arc::new(ShellBackend::new()))
    }

    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    #[must_use]
    pub fn native(&self) -> &dyn NativeGit {
        self.native.as_ref()
    }

    /// Reloads the repository snapshot. Failures are only logged.
    fn refresh(&self, repo: &Repository) {
        if let Err(e) = repo.refresh(self.native.as_ref()) {
            warn!(repo = %repo.name(), error = %e, "snapshot refresh failed");
        }
    }

    /// Runs git externally, refreshes, and turns a failing exit into a
    /// classified error. "Already up to date" counts as success.
    fn run_external(&self, repo: &Repository, args: &[String]) -> Result<String, GitError> {
        debug!(repo = %repo.name(), strategy = "external", args = ?redact(args), "running");
        let result = self.external.run(repo.path(), args);
        self.refresh(repo);

        let output = result.map_err(|e| GitError::new(ErrorKind::GitCommandFailed, e.to_string()))?;
        if output.success() || is_up_to_date(&output.output) {
            Ok(output.output)
        } else {
            Err(GitError::new(classify(&output.output), output.output))
        }
    }

    fn native_done(&self, repo: &Repository, operation: &str, outcome: NativeOutcome) {
        debug!(repo = %repo.name(), operation, strategy = "native", ?outcome, "completed");
        self.refresh(repo);
    }

    fn remote(repo: &Repository, name: &str) -> Result<Remote, GitError> {
        repo.remotes()
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| {
                GitError::new(ErrorKind::RemoteNotFound, format!("no remote named '{name}'"))
            })
    }

    // --- fetch ---

    /// Fetches from `opts.remote()`.
    ///
    /// # Errors
    ///
    /// Returns the classified `GitError`; `AuthenticationRequired` is
    /// returned without any retry.
    pub fn fetch(&self, repo: &Repository, opts: &FetchOptions) -> Result<(), GitError> {
        let remote = Self::remote(repo, opts.remote())?;
        check_auth_method(remote.url(), opts.credentials())?;

        if self.mode == ExecutionMode::External || opts.needs_external() {
            return self.fetch_external(repo, &remote, opts);
        }

        let refspec = branch_refspec(&remote, &repo.state().branch.name);
        self.fetch_native(repo, &remote, opts, refspec, RetryBudget::all())
    }

    fn fetch_native(
        &self,
        repo: &Repository,
        remote: &Remote,
        opts: &FetchOptions,
        refspec: String,
        budget: RetryBudget,
    ) -> Result<(), GitError> {
        let request = FetchRequest {
            remote: remote.name.clone(),
            refspec,
            credentials: opts.credentials().cloned(),
        };
        match self.native.fetch(repo.path(), &request) {
            Ok(outcome) => {
                self.native_done(repo, "fetch", outcome);
                Ok(())
            }
            Err(NativeError::AuthenticationRequired) => {
                Err(NativeError::AuthenticationRequired.into_git_error())
            }
            Err(NativeError::SshAgentMissing(reason)) if budget.contains(RetryBudget::SSH_AGENT) => {
                debug!(repo = %repo.name(), %reason, "ssh agent missing, retrying externally");
                self.fetch_external(repo, remote, opts)
            }
            Err(NativeError::RemoteRefNotFound(spec)) if budget.contains(RetryBudget::REMOTE_REF) => {
                let Some(first) = remote.refspecs.first() else {
                    return Err(NativeError::RemoteRefNotFound(spec).into_git_error());
                };
                debug!(repo = %repo.name(), %spec, retry = %first, "remote ref not found, retrying with configured refspec");
                self.fetch_native(repo, remote, opts, first.clone(), RetryBudget::empty())
            }
            Err(e) if budget.contains(RetryBudget::FALLBACK) => {
                debug!(repo = %repo.name(), error = %e, "native fetch failed, falling back");
                self.fetch_external(repo, remote, opts)
            }
            Err(e) => Err(e.into_git_error()),
        }
    }

    fn fetch_external(
        &self,
        repo: &Repository,
        remote: &Remote,
        opts: &FetchOptions,
    ) -> Result<(), GitError> {
        let mut args = vec!["fetch".to_string()];
        match (opts.credentials(), remote.url()) {
            (Some(credentials), Some(url)) => {
                args.push(url_with_credentials(url, credentials));
                args.extend(remote.refspecs.first().cloned());
            }
            _ => args.push(remote.name.clone()),
        }
        if opts.prune() {
            args.push("--prune".to_string());
        }
        if opts.dry_run() {
            args.push("--dry-run".to_string());
        }
        if opts.force() {
            args.push("--force".to_string());
        }
        if opts.progress() {
            args.push("--progress".to_string());
        }
        self.run_external(repo, &args).map(drop)
    }

    // --- pull ---

    /// Pulls `opts.reference()` (or the active branch's namesake) into HEAD.
    ///
    /// # Errors
    ///
    /// Returns the classified `GitError`; `AuthenticationRequired` is
    /// returned without any retry.
    pub fn pull(&self, repo: &Repository, opts: &PullOptions) -> Result<(), GitError> {
        let remote = Self::remote(repo, opts.remote())?;
        check_auth_method(remote.url(), opts.credentials())?;

        let branch = opts
            .reference()
            .map_or_else(|| repo.state().branch.name, ToString::to_string);

        if self.mode == ExecutionMode::External {
            return self.pull_external(repo, &remote, &branch, opts);
        }
        self.pull_native(repo, &remote, &branch, opts, RetryBudget::all())
    }

    fn pull_native(
        &self,
        repo: &Repository,
        remote: &Remote,
        branch: &str,
        opts: &PullOptions,
        budget: RetryBudget,
    ) -> Result<(), GitError> {
        let refspec = if opts.single_branch() {
            branch_refspec(remote, branch)
        } else {
            remote
                .refspecs
                .first()
                .cloned()
                .unwrap_or_else(|| branch_refspec(remote, branch))
        };
        let request = PullRequest {
            remote: remote.name.clone(),
            branch: branch.to_string(),
            refspec,
            credentials: opts.credentials().cloned(),
        };
        match self.native.pull(repo.path(), &request) {
            Ok(outcome) => {
                self.native_done(repo, "pull", outcome);
                Ok(())
            }
            Err(NativeError::AuthenticationRequired) => {
                Err(NativeError::AuthenticationRequired.into_git_error())
            }
            Err(NativeError::StaleReference(reference)) if budget.contains(RetryBudget::STALE_REF) => {
                debug!(repo = %repo.name(), %reference, "stale reference, fetching before retrying pull");
                let fetch = FetchOptions::builder()
                    .with_remote(remote.name.clone())
                    .maybe_with_credentials(opts.credentials().cloned())
                    .build();
                let refspec = branch_refspec(remote, branch);
                self.fetch_native(repo, remote, &fetch, refspec, RetryBudget::all())?;
                self.pull_native(repo, remote, branch, opts, budget - RetryBudget::STALE_REF)
            }
            Err(e) if budget.intersects(RetryBudget::SSH_AGENT | RetryBudget::FALLBACK) => {
                debug!(repo = %repo.name(), error = %e, "native pull failed, falling back");
                self.pull_external(repo, remote, branch, opts)
            }
            Err(e) => Err(e.into_git_error()),
        }
    }

    fn pull_external(
        &self,
        repo: &Repository,
        remote: &Remote,
        branch: &str,
        opts: &PullOptions,
    ) -> Result<(), GitError> {
        let mut args = vec!["pull".to_string()];
        if opts.force() {
            args.push("--force".to_string());
        }
        if opts.progress() {
            args.push("--progress".to_string());
        }
        match (opts.credentials(), remote.url()) {
            (Some(credentials), Some(url)) => args.push(url_with_credentials(url, credentials)),
            _ => args.push(remote.name.clone()),
        }
        args.push(branch.to_string());
        self.run_external(repo, &args).map(drop)
    }

    // --- merge ---

    /// Merges `opts.branch()` (or the selected remote branch) into HEAD.
    ///
    /// # Errors
    ///
    /// Returns `RemoteBranchNotSpecified` when there is nothing to merge,
    /// otherwise the classified `GitError`.
    pub fn merge(&self, repo: &Repository, opts: &MergeOptions) -> Result<(), GitError> {
        let branch = match opts.branch() {
            Some(branch) => branch.to_string(),
            None => repo
                .state()
                .remote
                .and_then(|r| r.selected_branch().map(|b| b.name.clone()))
                .ok_or_else(|| {
                    GitError::new(ErrorKind::RemoteBranchNotSpecified, "no remote branch selected")
                })?,
        };

        if self.mode == ExecutionMode::Native {
            match self.native.merge(repo.path(), &branch) {
                Ok(outcome) => {
                    self.native_done(repo, "merge", outcome);
                    return Ok(());
                }
                Err(e) => debug!(repo = %repo.name(), error = %e, "native merge declined, falling back"),
            }
        }

        let mut args = vec!["merge".to_string()];
        if opts.verbose() {
            args.push("--verbose".to_string());
        }
        if opts.no_stat() {
            args.push("--no-stat".to_string());
        }
        args.push(branch);
        self.run_external(repo, &args).map(drop)
    }

    // --- working tree ---

    /// Stages `opts.pathspecs()`.
    ///
    /// # Errors
    ///
    /// Returns the classified `GitError`.
    pub fn add(&self, repo: &Repository, opts: &AddOptions) -> Result<(), GitError> {
        use super::options::AddFlags;

        if self.mode == ExecutionMode::Native && opts.flags().is_empty() {
            match self.native.add(repo.path(), opts.pathspecs()) {
                Ok(()) => {
                    self.native_done(repo, "add", NativeOutcome::Updated);
                    return Ok(());
                }
                Err(e) => debug!(repo = %repo.name(), error = %e, "native add declined, falling back"),
            }
        }

        let mut args = vec!["add".to_string()];
        for (flag, arg) in [
            (AddFlags::UPDATE, "--update"),
            (AddFlags::FORCE, "--force"),
            (AddFlags::DRY_RUN, "--dry-run"),
        ] {
            if opts.flags().contains(flag) {
                args.push(arg.to_string());
            }
        }
        args.push("--".to_string());
        if opts.pathspecs().is_empty() {
            args.push(".".to_string());
        } else {
            args.extend(opts.pathspecs().iter().cloned());
        }
        self.run_external(repo, &args).map(drop)
    }

    /// Records a commit.
    ///
    /// # Errors
    ///
    /// Returns the classified `GitError` (e.g. `UserIdentityNotConfigured`).
    pub fn commit(&self, repo: &Repository, opts: &CommitOptions) -> Result<(), GitError> {
        let mut args = vec!["commit".to_string(), "-m".to_string(), opts.message().to_string()];
        if opts.amend() {
            args.push("--amend".to_string());
        }
        if opts.all() {
            args.push("--all".to_string());
        }
        self.run_external(repo, &args).map(drop)
    }

    /// Resets HEAD (and possibly index and working tree).
    ///
    /// # Errors
    ///
    /// Returns the classified `GitError`.
    pub fn reset(&self, repo: &Repository, opts: &ResetOptions) -> Result<(), GitError> {
        let mut args = vec!["reset".to_string(), opts.mode().as_flag().to_string()];
        args.extend(opts.target().map(ToString::to_string));
        self.run_external(repo, &args).map(drop)
    }

    /// Uncolored diff of the working tree against `target` (index when `None`).
    ///
    /// # Errors
    ///
    /// Returns the classified `GitError`.
    pub fn diff(&self, repo: &Repository, target: Option<&str>) -> Result<String, GitError> {
        let mut args = vec!["diff".to_string(), "--no-color".to_string()];
        args.extend(target.map(ToString::to_string));
        self.run_external(repo, &args)
    }

    /// Switches to `branch`.
    ///
    /// # Errors
    ///
    /// Returns the classified `GitError` (e.g. `MergeAbortedLocalChanges`).
    pub fn checkout(&self, repo: &Repository, branch: &str) -> Result<(), GitError> {
        let args = vec!["checkout".to_string(), branch.to_string()];
        self.run_external(repo, &args).map(drop)
    }

    /// Paths with pending changes, sorted.
    ///
    /// # Errors
    ///
    /// Returns the classified `GitError` if both strategies fail.
    pub fn status(&self, repo: &Repository) -> Result<Vec<String>, GitError> {
        if self.mode == ExecutionMode::Native {
            match self.native.status(repo.path()) {
                Ok(paths) => {
                    self.native_done(repo, "status", NativeOutcome::UpToDate);
                    return Ok(paths);
                }
                Err(e) => debug!(repo = %repo.name(), error = %e, "native status failed, falling back"),
            }
        }

        let args = vec![
            "status".to_string(),
            "--porcelain".to_string(),
            "--untracked-files=all".to_string(),
        ];
        let output = self.run_external(repo, &args)?;
        let mut paths: Vec<String> = output
            .lines()
            .filter_map(|line| line.get(3..))
            .map(|path| path.rsplit_once(" -> ").map_or(path, |(_, to)| to).to_string())
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    /// Reads a configuration value; `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns the classified `GitError` if both strategies fail.
    pub fn config_get(&self, repo: &Repository, key: &str) -> Result<Option<String>, GitError> {
        if self.mode == ExecutionMode::Native {
            match self.native.config_get(repo.path(), key) {
                Ok(value) => {
                    self.native_done(repo, "config_get", NativeOutcome::UpToDate);
                    return Ok(value);
                }
                Err(e) => debug!(repo = %repo.name(), error = %e, "native config read failed, falling back"),
            }
        }

        let args = vec!["config".to_string(), "--get".to_string(), key.to_string()];
        let result = self.external.run(repo.path(), &args);
        self.refresh(repo);
        let output = result.map_err(|e| GitError::new(ErrorKind::GitCommandFailed, e.to_string()))?;
        match output.code {
            Some(0) => Ok(Some(output.output)),
            // git config exits 1 for a missing key
            Some(1) if output.output.is_empty() => Ok(None),
            _ => Err(GitError::new(classify(&output.output), output.output)),
        }
    }

    /// Writes a repository-local configuration value.
    ///
    /// # Errors
    ///
    /// Returns the classified `GitError`.
    pub fn config_set(&self, repo: &Repository, key: &str, value: &str) -> Result<(), GitError> {
        let args = vec!["config".to_string(), key.to_string(), value.to_string()];
        self.run_external(repo, &args).map(drop)
    }
}

/// Maps `branch` on `remote` to its remote-tracking ref.
fn branch_refspec(remote: &Remote, branch: &str) -> String {
    format!("+refs/heads/{branch}:refs/remotes/{}/{branch}", remote.name)
}

/// Masks `user:password@` in URL arguments for logging.
fn redact(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let Some((scheme, rest)) = arg.split_once("://") else {
                return arg.clone();
            };
            let authority = rest.split('/').next().unwrap_or_default();
            match authority.rsplit_once('@') {
                Some((_, host)) => format!("{scheme}://***@{host}{}", &rest[authority.len()..]),
                None => arg.clone(),
            }
        })
        .collect()
}
