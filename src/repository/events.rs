// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! State-change notifications.
//!
//! ```text
//! Repository --publish--> EventBus --flume--> subscriber 1 (progress bar)
//!                                      \---> subscriber 2 (UI, tests)
//! ```
//!
//! Delivery is best-effort: a subscriber whose receiver was dropped is
//! pruned on the next publish.

use std::sync::{Arc, Mutex, PoisonError};

use flume::{Receiver, Sender};

use super::RepoId;
use super::status::WorkStatus;

/// What changed on a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Work status moved `from -> to`.
    StatusChanged { from: WorkStatus, to: WorkStatus },
    /// Snapshot reloaded from disk.
    Refreshed,
    /// Active branch, remote, or remote branch changed.
    SelectionChanged,
}

/// Notification sent after a repository mutation completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEvent {
    pub repo: RepoId,
    pub name: String,
    pub kind: EventKind,
}

/// Subscription list shared by every repository of a workspace.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<RepoEvent>>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<RepoEvent> {
        let (tx, rx) = flume::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Sends `event` to all live subscribers.
    pub fn publish(&self, event: &RepoEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
