// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Progress bar fed by repository events.
//!
//! ```text
//! EventBus --subscribe--> watcher thread
//!    Queued  -> Working          set message to the repository name
//!    Working -> Success|Fail|Paused   advance by one
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use flume::RecvTimeoutError;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::repository::events::{EventBus, EventKind, RepoEvent};
use crate::repository::status::WorkStatus;

const POLL: Duration = Duration::from_millis(100);

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Draws batch progress until [`BatchProgress::finish`] is called.
pub(crate) struct BatchProgress {
    bar: ProgressBar,
    stop: Arc<AtomicBool>,
    watcher: Option<JoinHandle<()>>,
}

impl BatchProgress {
    /// Starts watching `events` for `total` jobs; draws nothing when `hidden`.
    pub(crate) fn start(events: &EventBus, total: usize, hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX)).with_style(bar_style())
        };
        let stop = Arc::new(AtomicBool::new(false));
        let receiver = events.subscribe();

        let watcher = {
            let bar = bar.clone();
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                while !stop.load(Ordering::Acquire) {
                    match receiver.recv_timeout(POLL) {
                        Ok(event) => advance(&bar, event),
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
                for event in receiver.try_iter() {
                    advance(&bar, event);
                }
            })
        };

        Self {
            bar,
            stop,
            watcher: Some(watcher),
        }
    }

    /// Stops the watcher off the async workers, clears the bar and returns
    /// the number of jobs seen finishing.
    pub(crate) async fn finish(mut self) -> u64 {
        self.stop.store(true, Ordering::Release);
        if let Some(watcher) = self.watcher.take() {
            match tokio::task::spawn_blocking(move || watcher.join()).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => debug!("progress watcher panicked"),
                Err(e) => debug!(error = %e, "progress watcher join failed"),
            }
        }
        let completed = self.bar.position();
        self.bar.finish_and_clear();
        completed
    }
}

fn advance(bar: &ProgressBar, event: RepoEvent) {
    if let EventKind::StatusChanged { to, .. } = event.kind {
        match to {
            WorkStatus::Working => bar.set_message(event.name),
            WorkStatus::Success | WorkStatus::Fail | WorkStatus::Paused => bar.inc(1),
            WorkStatus::Available | WorkStatus::Queued => {}
        }
    }
}
