// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch, remote and commit records read from disk.
//!
//! ```text
//! RepoSnapshot (one read of .git/)
//!   branches  [Branch { name, hash, upstream, divergence, clean }]
//!   head      name of the checked-out branch (None = detached)
//!   remotes   [Remote { name, urls, refspecs, branches, selected }]
//!   commit    HEAD commit
//!   stashes   [StashEntry]
//! ```

use serde::Serialize;

/// Name used for the synthetic branch of a detached HEAD.
pub const DETACHED_HEAD: &str = "HEAD";

/// Commits ahead of / behind the upstream branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Divergence {
    pub ahead: usize,
    pub behind: usize,
}

impl Divergence {
    #[must_use]
    pub const fn new(ahead: usize, behind: usize) -> Self {
        Self { ahead, behind }
    }

    #[must_use]
    pub const fn is_synced(&self) -> bool {
        self.ahead == 0 && self.behind == 0
    }
}

/// A local branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    /// Short name (`main`, `feature/x`).
    pub name: String,
    /// Hex object id of the branch tip.
    pub hash: String,
    /// Upstream short name (`origin/main`) if configured.
    pub upstream: Option<String>,
    /// Ahead/behind counts; `None` when not computable (no upstream).
    pub divergence: Option<Divergence>,
    /// Clean working tree. Only meaningful for the checked-out branch.
    pub clean: bool,
}

impl Branch {
    pub fn new(name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            upstream: None,
            divergence: None,
            clean: true,
        }
    }

    /// Renders divergence as `↑ahead ↓behind`, or `?` when unknown.
    #[must_use]
    pub fn divergence_label(&self) -> String {
        self.divergence.map_or_else(
            || "?".to_string(),
            |d| format!("\u{2191}{} \u{2193}{}", d.ahead, d.behind),
        )
    }
}

/// A branch on a remote (`refs/remotes/<remote>/<name>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteBranch {
    /// Short name including the remote (`origin/main`).
    pub name: String,
    /// Hex object id.
    pub hash: String,
}

impl RemoteBranch {
    /// Branch name without the remote prefix.
    #[must_use]
    pub fn branch_name(&self) -> &str {
        self.name
            .split_once('/')
            .map_or(self.name.as_str(), |(_, branch)| branch)
    }
}

/// A configured remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    pub urls: Vec<String>,
    /// Fetch refspecs in configuration order.
    pub refspecs: Vec<String>,
    pub branches: Vec<RemoteBranch>,
    /// Index into `branches` of the selected remote branch.
    selected: Option<usize>,
}

impl Remote {
    pub fn new(name: impl Into<String>, urls: Vec<String>, refspecs: Vec<String>) -> Self {
        Self {
            name: name.into(),
            urls,
            refspecs,
            branches: Vec::new(),
            selected: None,
        }
    }

    /// Sets the remote branches and selects the first one.
    #[must_use]
    pub fn with_branches(mut self, branches: Vec<RemoteBranch>) -> Self {
        self.selected = if branches.is_empty() { None } else { Some(0) };
        self.branches = branches;
        self
    }

    /// First URL, used for scheme checks and credential embedding.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }

    #[must_use]
    pub fn selected_branch(&self) -> Option<&RemoteBranch> {
        self.selected.and_then(|i| self.branches.get(i))
    }

    /// Selects a remote branch by short name. Returns false if absent.
    pub fn select_branch(&mut self, name: &str) -> bool {
        match self.branches.iter().position(|b| b.name == name) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    /// Selects the remote branch tracking `branch`, if present.
    pub(crate) fn select_tracking(&mut self, branch: &str) {
        if let Some(index) = self.branches.iter().position(|b| b.branch_name() == branch) {
            self.selected = Some(index);
        }
    }
}

/// A commit summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub hash: String,
    pub author: String,
    pub summary: String,
    /// Commit time in seconds since the epoch.
    pub time: i64,
}

impl Commit {
    /// Abbreviated hash.
    #[must_use]
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

/// A stash record (`stash@{index}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StashEntry {
    pub index: usize,
    pub message: String,
}

/// Everything read from a repository on load or refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoSnapshot {
    pub branches: Vec<Branch>,
    /// Checked-out branch name; `None` when HEAD is detached or unborn.
    pub head: Option<String>,
    pub remotes: Vec<Remote>,
    pub commit: Option<Commit>,
    pub stashes: Vec<StashEntry>,
}
