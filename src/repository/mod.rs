// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository entity and work-status state machine.
//!
//! ```text
//! Repository (Arc, shared by Jobs and the presentation layer)
//!   id, path, name                 immutable
//!   RwLock<RepoData>
//!     branches, remotes, stashes   replaced on refresh
//!     State { branch, remote, commit, status, message }
//!   operation lock                 one running job per repository
//!   EventBus                       notified after every mutation
//! ```
//!
//! Writes come from the job executing against the repository and from
//! navigation; readers get cloned values, never references into the lock.

pub mod discovery;
pub mod events;
pub mod model;
pub mod status;


use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::trace;

use crate::error::{GitError, QueueError};
use crate::git::backend::NativeGit;

use events::{EventBus, EventKind, RepoEvent};
use model::{Branch, Commit, DETACHED_HEAD, Remote, RepoSnapshot, StashEntry};
use status::WorkStatus;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique repository identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoId(u64);

impl RepoId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mutable per-repository state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// Active branch (member of the branch list).
    pub branch: Branch,
    /// Active remote (member of the remote list), `None` without remotes.
    pub remote: Option<Remote>,
    /// HEAD commit.
    pub commit: Option<Commit>,
    pub status: WorkStatus,
    /// Last error message, cleared when a new job is queued.
    pub message: Option<String>,
}

#[derive(Debug)]
struct RepoData {
    branches: Vec<Branch>,
    remotes: Vec<Remote>,
    stashes: Vec<StashEntry>,
    branch: usize,
    remote: Option<usize>,
    commit: Option<Commit>,
    status: WorkStatus,
    message: Option<String>,
}

impl RepoData {
    fn from_snapshot(snapshot: RepoSnapshot) -> Self {
        let mut data = Self {
            branches: Vec::new(),
            remotes: Vec::new(),
            stashes: Vec::new(),
            branch: 0,
            remote: None,
            commit: None,
            status: WorkStatus::Available,
            message: None,
        };
        data.apply(snapshot);
        data
    }

    /// Replaces disk-derived data. The active branch follows HEAD; the active
    /// remote and its selected branch are kept by name where they still exist.
    fn apply(&mut self, snapshot: RepoSnapshot) {
        let previous_remote = self
            .remote
            .and_then(|i| self.remotes.get(i))
            .map(|r| (r.name.clone(), r.selected_branch().map(|b| b.name.clone())));

        let RepoSnapshot {
            mut branches,
            head,
            mut remotes,
            commit,
            stashes,
        } = snapshot;

        // The checked-out branch must be listed: unborn and detached HEADs
        // get a synthetic entry.
        let wanted = head.clone().unwrap_or_else(|| DETACHED_HEAD.to_string());
        if !branches.iter().any(|b| b.name == wanted) {
            let hash = commit.as_ref().map(|c| c.hash.clone()).unwrap_or_default();
            branches.insert(0, Branch::new(wanted.clone(), hash));
        }
        self.branch = branches
            .iter()
            .position(|b| b.name == wanted)
            .unwrap_or(0);

        self.remote = match previous_remote {
            Some((name, selected)) => remotes
                .iter()
                .position(|r| r.name == name)
                .map(|index| {
                    if let Some(selected) = selected {
                        remotes[index].select_branch(&selected);
                    }
                    index
                })
                .or_else(|| (!remotes.is_empty()).then_some(0)),
            None => {
                if let Some(head) = &head {
                    for remote in &mut remotes {
                        remote.select_tracking(head);
                    }
                }
                (!remotes.is_empty()).then_some(0)
            }
        };

        self.branches = branches;
        self.remotes = remotes;
        self.stashes = stashes;
        self.commit = commit;
    }

    fn state(&self) -> State {
        State {
            branch: self.branches[self.branch].clone(),
            remote: self.remote.map(|i| self.remotes[i].clone()),
            commit: self.commit.clone(),
            status: self.status,
            message: self.message.clone(),
        }
    }
}

/// A git repository tracked by the batch engine.
#[derive(Debug)]
pub struct Repository {
    id: RepoId,
    path: PathBuf,
    name: String,
    data: RwLock<RepoData>,
    operation_lock: Arc<tokio::sync::Mutex<()>>,
    events: EventBus,
}

impl Repository {
    /// Opens the repository at `path`, reading its snapshot through `native`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the repository cannot be read.
    pub fn open(
        path: impl AsRef<Path>,
        native: &dyn NativeGit,
        events: EventBus,
    ) -> Result<Arc<Self>, GitError> {
        let path = path.as_ref();
        let snapshot = native.snapshot(path).map_err(|e| e.into_git_error())?;
        Ok(Self::from_snapshot(path, snapshot, events))
    }

    /// Builds a repository from an already-read snapshot.
    pub fn from_snapshot(
        path: impl Into<PathBuf>,
        snapshot: RepoSnapshot,
        events: EventBus,
    ) -> Arc<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Arc::new(Self {
            id: RepoId::next(),
            path,
            name,
            data: RwLock::new(RepoData::from_snapshot(snapshot)),
            operation_lock: Arc::new(tokio::sync::Mutex::new(())),
            events,
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, RepoData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RepoData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, kind: EventKind) {
        self.events.publish(&RepoEvent {
            repo: self.id,
            name: self.name.clone(),
            kind,
        });
    }

    #[must_use]
    pub const fn id(&self) -> RepoId {
        self.id
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Consistent copy of the current state.
    #[must_use]
    pub fn state(&self) -> State {
        self.read().state()
    }

    #[must_use]
    pub fn status(&self) -> WorkStatus {
        self.read().status
    }

    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.read().message.clone()
    }

    #[must_use]
    pub fn branches(&self) -> Vec<Branch> {
        self.read().branches.clone()
    }

    #[must_use]
    pub fn remotes(&self) -> Vec<Remote> {
        self.read().remotes.clone()
    }

    #[must_use]
    pub fn stashes(&self) -> Vec<StashEntry> {
        self.read().stashes.clone()
    }

    /// Lock serializing operations against this repository.
    #[must_use]
    pub fn operation_lock(&self) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(&self.operation_lock)
    }

    /// Moves the work status to `to`, optionally recording a message.
    ///
    /// Queuing clears the previous message. The notification fires after the
    /// write lock is released.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::InvalidTransition` if the state machine forbids
    /// the move; the state is left unchanged.
    pub fn transition(&self, to: WorkStatus, message: Option<String>) -> Result<(), QueueError> {
        let from = {
            let mut data = self.write();
            let from = data.status;
            if !from.can_transition_to(to) {
                return Err(QueueError::InvalidTransition {
                    repo: self.name.clone(),
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
            data.status = to;
            if message.is_some() || to == WorkStatus::Queued {
                data.message = message;
            }
            from
        };
        trace!(repo = %self.name, %from, %to, "status transition");
        self.notify(EventKind::StatusChanged { from, to });
        Ok(())
    }

    /// Replaces branches, remotes, commit and stashes with a fresh read.
    pub fn apply_snapshot(&self, snapshot: RepoSnapshot) {
        self.write().apply(snapshot);
        self.notify(EventKind::Refreshed);
    }

    /// Re-reads the repository from disk.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the snapshot cannot be read; the in-memory
    /// data is left unchanged in that case.
    pub fn refresh(&self, native: &dyn NativeGit) -> Result<(), GitError> {
        let snapshot = native
            .snapshot(&self.path)
            .map_err(|e| e.into_git_error())?;
        self.apply_snapshot(snapshot);
        Ok(())
    }

    /// Selects the next remote, wrapping around.
    pub fn next_remote(&self) {
        self.cycle_remote(true);
    }

    /// Selects the previous remote, wrapping around.
    pub fn previous_remote(&self) {
        self.cycle_remote(false);
    }

    fn cycle_remote(&self, forward: bool) {
        let changed = {
            let mut data = self.write();
            let count = data.remotes.len();
            match data.remote {
                Some(current) if count > 1 => {
                    data.remote = Some(if forward {
                        (current + 1) % count
                    } else {
                        (current + count - 1) % count
                    });
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.notify(EventKind::SelectionChanged);
        }
    }

    /// Selects a remote by name. Returns false if no such remote exists.
    pub fn select_remote(&self, name: &str) -> bool {
        let found = {
            let mut data = self.write();
            let index = data.remotes.iter().position(|r| r.name == name);
            if index.is_some() {
                data.remote = index;
            }
            index.is_some()
        };
        if found {
            self.notify(EventKind::SelectionChanged);
        }
        found
    }

    /// Selects a branch of the active remote by short name (`origin/main`).
    /// Returns false if there is no active remote or no such branch.
    pub fn select_remote_branch(&self, name: &str) -> bool {
        let found = {
            let mut data = self.write();
            match data.remote {
                Some(index) => data.remotes[index].select_branch(name),
                None => false,
            }
        };
        if found {
            self.notify(EventKind::SelectionChanged);
        }
        found
    }
}
