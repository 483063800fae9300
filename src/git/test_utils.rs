// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Scripted backends for executor and scheduler tests.
//!
//! Both fakes record every call; scripted results are consumed in order and
//! fall back to success once exhausted.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::backend::{
    CommandOutput, ExternalGit, FetchRequest, NativeError, NativeGit, NativeOutcome, PullRequest,
};
use crate::error::ProcessError;
use crate::repository::Repository;
use crate::repository::events::EventBus;
use crate::repository::model::{Branch, Commit, Remote, RemoteBranch, RepoSnapshot};

type Script<T> = Mutex<VecDeque<Result<T, NativeError>>>;

/// Snapshot with `main` checked out and an `origin` remote at `url`.
pub(crate) fn snapshot_with_remote(url: &str) -> RepoSnapshot {
    RepoSnapshot {
        branches: vec![Branch::new("main", "1111111111111111111111111111111111111111")],
        head: Some("main".to_string()),
        remotes: vec![
            Remote::new(
                "origin",
                vec![url.to_string()],
                vec!["+refs/heads/*:refs/remotes/origin/*".to_string()],
            )
            .with_branches(vec![RemoteBranch {
                name: "origin/main".to_string(),
                hash: "1111111111111111111111111111111111111111".to_string(),
            }]),
        ],
        commit: Some(Commit {
            hash: "1111111111111111111111111111111111111111".to_string(),
            author: "Tester".to_string(),
            summary: "initial import".to_string(),
            time: 1_700_000_000,
        }),
        stashes: Vec::new(),
    }
}

pub(crate) fn fake_repo(name: &str, url: &str) -> Arc<Repository> {
    Repository::from_snapshot(
        Path::new("/nonexistent").join(name),
        snapshot_with_remote(url),
        EventBus::new(),
    )
}

/// Scripted in-process backend.
#[derive(Default)]
pub(crate) struct FakeNative {
    pub(crate) snapshot: Mutex<Option<RepoSnapshot>>,
    pub(crate) fetch: Script<NativeOutcome>,
    pub(crate) pull: Script<NativeOutcome>,
    pub(crate) merge: Script<NativeOutcome>,
    pub(crate) calls: Mutex<Vec<String>>,
    /// Value returned by `config_get`; unsupported when `None`.
    pub(crate) config: Mutex<Option<String>>,
    pub(crate) pull_refspecs: Mutex<Vec<String>>,
    pub(crate) snapshots_taken: AtomicUsize,
    /// Time each fetch/pull takes.
    pub(crate) delay: Duration,
    active: AtomicUsize,
    pub(crate) max_active: AtomicUsize,
}

impl FakeNative {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub(crate) fn script_fetch(&self, result: Result<NativeOutcome, NativeError>) {
        self.fetch.lock().unwrap().push_back(result);
    }

    pub(crate) fn script_pull(&self, result: Result<NativeOutcome, NativeError>) {
        self.pull.lock().unwrap().push_back(result);
    }

    pub(crate) fn script_merge(&self, result: Result<NativeOutcome, NativeError>) {
        self.merge.lock().unwrap().push_back(result);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn work(&self, call: String, script: &Script<NativeOutcome>) -> Result<NativeOutcome, NativeError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let result = script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(NativeOutcome::Updated));
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl NativeGit for FakeNative {
    fn snapshot(&self, _repo: &Path) -> Result<RepoSnapshot, NativeError> {
        self.snapshots_taken.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .snapshot
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| snapshot_with_remote("https://example.com/repo.git")))
    }

    fn fetch(&self, _repo: &Path, request: &FetchRequest) -> Result<NativeOutcome, NativeError> {
        self.work(format!("fetch {}", request.refspec), &self.fetch)
    }

    fn pull(&self, _repo: &Path, request: &PullRequest) -> Result<NativeOutcome, NativeError> {
        self.pull_refspecs
            .lock()
            .unwrap()
            .push(request.refspec.clone());
        self.work(format!("pull {}", request.branch), &self.pull)
    }

    fn merge(&self, _repo: &Path, branch: &str) -> Result<NativeOutcome, NativeError> {
        self.work(format!("merge {branch}"), &self.merge)
    }

    fn status(&self, _repo: &Path) -> Result<Vec<String>, NativeError> {
        Err(NativeError::Unsupported("status".to_string()))
    }

    fn config_get(&self, _repo: &Path, _key: &str) -> Result<Option<String>, NativeError> {
        self.config
            .lock()
            .unwrap()
            .clone()
            .map(Some)
            .ok_or_else(|| NativeError::Unsupported("config".to_string()))
    }
}

/// Scripted subprocess backend.
#[derive(Default)]
pub(crate) struct FakeExternal {
    pub(crate) outputs: Mutex<VecDeque<CommandOutput>>,
    pub(crate) calls: Mutex<Vec<Vec<String>>>,
}

impl FakeExternal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script(&self, code: i32, output: &str) {
        self.outputs.lock().unwrap().push_back(CommandOutput {
            code: Some(code),
            output: output.to_string(),
        });
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ExternalGit for FakeExternal {
    fn run(&self, _cwd: &Path, args: &[String]) -> Result<CommandOutput, ProcessError> {
        self.calls.lock().unwrap().push(args.to_vec());
        Ok(self.outputs.lock().unwrap().pop_front().unwrap_or(CommandOutput {
            code: Some(0),
            output: String::new(),
        }))
    }
}
