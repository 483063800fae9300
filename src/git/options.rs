// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-operation option sets.
//!
//! ```text
//! FetchOptions  remote, credentials, prune, dry_run, progress, force
//! PullOptions   remote, reference, credentials, single_branch, progress, force
//! MergeOptions  branch, verbose, no_stat
//! AddOptions    pathspecs, AddFlags { UPDATE | FORCE | DRY_RUN }
//! CommitOptions message, amend, all
//! ResetOptions  target, ResetMode
//! ```
//!
//! Options that only the git CLI understands (prune, dry-run, add flags)
//! route the operation to the external strategy.

use bitflags::bitflags;
use bon::Builder;

use super::auth::Credentials;

/// Remote used when none is given.
pub const DEFAULT_REMOTE: &str = "origin";

/// Options for `fetch`.
#[derive(Debug, Clone, Builder)]
pub struct FetchOptions {
    #[builder(into, setters(name = with_remote), default = DEFAULT_REMOTE.to_string())]
    remote: String,
    #[builder(setters(name = with_credentials))]
    credentials: Option<Credentials>,
    #[builder(setters(name = with_prune), default = false)]
    prune: bool,
    #[builder(setters(name = with_dry_run), default = false)]
    dry_run: bool,
    #[builder(setters(name = with_progress), default = false)]
    progress: bool,
    #[builder(setters(name = with_force), default = false)]
    force: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl FetchOptions {
    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    #[must_use]
    pub const fn prune(&self) -> bool {
        self.prune
    }

    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    #[must_use]
    pub const fn progress(&self) -> bool {
        self.progress
    }

    #[must_use]
    pub const fn force(&self) -> bool {
        self.force
    }

    /// Whether any option requires the git CLI.
    #[must_use]
    pub const fn needs_external(&self) -> bool {
        self.prune || self.dry_run
    }

    /// Replaces the credentials, keeping everything else.
    #[must_use]
    pub fn set_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }
}

/// Options for `pull`.
#[derive(Debug, Clone, Builder)]
pub struct PullOptions {
    #[builder(into, setters(name = with_remote), default = DEFAULT_REMOTE.to_string())]
    remote: String,
    /// Remote branch; the active branch's namesake when `None`.
    #[builder(into, setters(name = with_reference))]
    reference: Option<String>,
    #[builder(setters(name = with_credentials))]
    credentials: Option<Credentials>,
    /// Native pulls fetch only `reference` instead of the remote's
    /// configured refspec.
    #[builder(setters(name = with_single_branch), default = false)]
    single_branch: bool,
    #[builder(setters(name = with_progress), default = false)]
    progress: bool,
    #[builder(setters(name = with_force), default = false)]
    force: bool,
}

impl Default for PullOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PullOptions {
    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    #[must_use]
    pub const fn single_branch(&self) -> bool {
        self.single_branch
    }

    #[must_use]
    pub const fn progress(&self) -> bool {
        self.progress
    }

    #[must_use]
    pub const fn force(&self) -> bool {
        self.force
    }

    #[must_use]
    pub fn set_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }
}

/// Options for `merge`.
#[derive(Debug, Clone, Default, Builder)]
pub struct MergeOptions {
    /// Branch to merge; the selected remote branch when `None`.
    #[builder(into, setters(name = with_branch))]
    branch: Option<String>,
    #[builder(setters(name = with_verbose), default = false)]
    verbose: bool,
    /// Suppress the diffstat.
    #[builder(setters(name = with_no_stat), default = false)]
    no_stat: bool,
}

impl MergeOptions {
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    #[must_use]
    pub const fn no_stat(&self) -> bool {
        self.no_stat
    }
}

bitflags! {
    /// Flags for `git add`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AddFlags: u8 {
        /// Stage modifications and deletions of tracked files only.
        const UPDATE = 0x01;
        /// Allow adding ignored files.
        const FORCE = 0x02;
        /// Show what would be staged.
        const DRY_RUN = 0x04;
    }
}

/// Options for `add`.
#[derive(Debug, Clone, Default, Builder)]
pub struct AddOptions {
    #[builder(setters(name = with_pathspecs), default)]
    pathspecs: Vec<String>,
    #[builder(setters(name = with_flags), default)]
    flags: AddFlags,
}

impl AddOptions {
    #[must_use]
    pub fn pathspecs(&self) -> &[String] {
        &self.pathspecs
    }

    #[must_use]
    pub const fn flags(&self) -> AddFlags {
        self.flags
    }
}

/// Options for `commit`.
#[derive(Debug, Clone, Builder)]
pub struct CommitOptions {
    #[builder(into, setters(name = with_message))]
    message: String,
    #[builder(setters(name = with_amend), default = false)]
    amend: bool,
    /// Stage tracked modifications first (`-a`).
    #[builder(setters(name = with_all), default = false)]
    all: bool,
}

impl CommitOptions {
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn amend(&self) -> bool {
        self.amend
    }

    #[must_use]
    pub const fn all(&self) -> bool {
        self.all
    }
}

/// `git reset` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMode {
    Soft,
    #[default]
    Mixed,
    Hard,
}

impl ResetMode {
    #[must_use]
    pub const fn as_flag(self) -> &'static str {
        match self {
            Self::Soft => "--soft",
            Self::Mixed => "--mixed",
            Self::Hard => "--hard",
        }
    }
}

/// Options for `reset`.
#[derive(Debug, Clone, Default, Builder)]
pub struct ResetOptions {
    /// Commit to reset to; HEAD when `None`.
    #[builder(into, setters(name = with_target))]
    target: Option<String>,
    #[builder(setters(name = with_mode), default)]
    mode: ResetMode,
}

impl ResetOptions {
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    #[must_use]
    pub const fn mode(&self) -> ResetMode {
        self.mode
    }
}
