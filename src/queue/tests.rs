// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::{Job, JobKind, JobOptions, JobQueue, Scheduler};
use crate::error::{ErrorKind, QueueError};
use crate::git::backend::{NativeError, NativeOutcome};
use crate::git::test_utils::{FakeExternal, FakeNative, fake_repo};
use crate::git::{Credentials, ExecutionMode, Executor};
use crate::repository::status::WorkStatus;

const URL: &str = "https://example.com/org/repo.git";

fn scheduler(native: FakeNative, concurrency: usize) -> (Scheduler, Arc<FakeNative>, Arc<FakeExternal>) {
    let native = Arc::new(native);
    let external = Arc::new(FakeExternal::new());
    let executor = Executor::new(ExecutionMode::Native, native.clone(), external.clone());
    (Scheduler::with_concurrency(executor, concurrency), native, external)
}

// --- JobQueue ---

#[test]
fn test_duplicate_job_is_rejected() {
    let queue = JobQueue::new();
    let repo = fake_repo("alpha", URL);

    queue.add(Job::new(JobKind::Fetch, repo.clone())).unwrap();
    let err = queue.add(Job::new(JobKind::Fetch, repo.clone())).unwrap_err();

    assert_eq!(queue.len(), 1);
    insta::assert_snapshot!(err.to_string(), @"'alpha' already has a queued fetch job");
}

#[test]
fn test_different_kinds_for_one_repository_coexist() {
    let queue = JobQueue::new();
    let repo = fake_repo("alpha", URL);

    queue.add(Job::new(JobKind::Fetch, repo.clone())).unwrap();
    queue.add(Job::new(JobKind::Merge, repo.clone())).unwrap();

    assert_eq!(queue.len(), 2);
    let removed = queue.remove(repo.id(), repo.name()).unwrap();
    assert_eq!(removed.len(), 2);
    assert!(queue.is_empty());
}

#[test]
fn test_remove_missing_repository_fails() {
    let queue = JobQueue::new();
    let queued = fake_repo("alpha", URL);
    let other = fake_repo("beta", URL);
    queue.add(Job::new(JobKind::Pull, queued)).unwrap();

    let err = queue.remove(other.id(), other.name()).unwrap_err();
    assert_eq!(err, QueueError::NotInQueue { repo: "beta".to_string() });
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_find_returns_matching_job() {
    let queue = JobQueue::new();
    let repo = fake_repo("alpha", URL);
    queue.add(Job::new(JobKind::Pull, repo.clone())).unwrap();

    let job = queue.find(repo.id()).expect("queued");
    assert_eq!(job.kind(), JobKind::Pull);
    assert!(queue.contains(repo.id()));
    assert!(queue.find(fake_repo("beta", URL).id()).is_none());
}

#[test]
fn test_job_defaults_to_active_remote() {
    let repo = fake_repo("alpha", URL);
    let job = Job::new(JobKind::Fetch, repo);
    let JobOptions::Fetch(opts) = job.options() else {
        panic!("expected fetch options");
    };
    assert_eq!(opts.remote(), "origin");
    assert!(opts.credentials().is_none());

    let job = job.with_credentials(Credentials::new("u", "p"));
    let JobOptions::Fetch(opts) = job.options() else {
        panic!("expected fetch options");
    };
    assert_eq!(opts.credentials().map(|c| c.user.as_str()), Some("u"));
}

#[test]
fn test_remove_key_drops_only_that_job() {
    let queue = JobQueue::new();
    let repo = fake_repo("alpha", URL);
    let fetch = Job::new(JobKind::Fetch, repo.clone());
    let key = fetch.key();
    queue.add(fetch).unwrap();
    queue.add(Job::new(JobKind::Pull, repo.clone())).unwrap();

    assert!(queue.remove_key(&key).is_some());
    assert!(queue.remove_key(&key).is_none());
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.find(repo.id()).map(|j| j.kind()), Some(JobKind::Pull));
}

// --- Scheduler ---

#[test]
fn test_add_job_marks_repository_queued() {
    let (sched, _, _) = scheduler(FakeNative::new(), 2);
    let repo = fake_repo("alpha", URL);

    sched.add_job(Job::new(JobKind::Fetch, repo.clone())).unwrap();
    assert_eq!(repo.status(), WorkStatus::Queued);

    assert!(sched.add_job(Job::new(JobKind::Fetch, repo.clone())).is_err());
    assert_eq!(sched.queue().len(), 1);

    sched.remove_from_queue(&repo).unwrap();
    assert_eq!(repo.status(), WorkStatus::Available);
    assert!(matches!(
        sched.remove_from_queue(&repo),
        Err(QueueError::NotInQueue { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_bound_is_respected() {
    let (sched, native, _) = scheduler(FakeNative::with_delay(Duration::from_millis(40)), 2);
    let repos: Vec<_> = (0..8).map(|i| fake_repo(&format!("repo{i}"), URL)).collect();
    for repo in &repos {
        sched.add_job(Job::new(JobKind::Fetch, repo.clone())).unwrap();
    }

    let report = sched.start_jobs().await;

    assert_eq!(report.succeeded.len(), 8);
    assert!(report.failed.is_empty());
    let max = native.max_active.load(Ordering::SeqCst);
    assert!((1..=2).contains(&max), "max concurrent = {max}");
    assert!(sched.queue().is_empty());
}

#[tokio::test]
async fn test_up_to_date_is_success() {
    let (sched, native, _) = scheduler(FakeNative::new(), 2);
    native.script_pull(Ok(NativeOutcome::UpToDate));
    let repo = fake_repo("alpha", URL);
    sched.add_job(Job::new(JobKind::Pull, repo.clone())).unwrap();

    let report = sched.start_jobs().await;

    assert!(report.is_clean());
    assert_eq!(repo.status(), WorkStatus::Success);
    assert_eq!(repo.message(), None);
}

#[tokio::test]
async fn test_auth_required_pauses_into_failover() {
    let (sched, native, external) = scheduler(FakeNative::new(), 2);
    native.script_pull(Err(NativeError::AuthenticationRequired));
    let repo = fake_repo("alpha", URL);
    sched.add_job(Job::new(JobKind::Pull, repo.clone())).unwrap();

    let report = sched.start_jobs().await;

    assert_eq!(repo.status(), WorkStatus::Paused);
    assert_eq!(repo.message().as_deref(), Some("authentication required"));
    assert!(report.failed.is_empty());
    assert_eq!(report.paused.len(), 1);
    assert!(sched.failover().contains(repo.id()));
    assert!(!sched.queue().contains(repo.id()));
    assert!(external.calls().is_empty());

    sched
        .resubmit(&repo, &Credentials::new("alice", "s3cret"))
        .unwrap();
    assert_eq!(repo.status(), WorkStatus::Queued);
    assert!(sched.failover().is_empty());
    let job = sched.is_in_the_queue(&repo).expect("back in primary queue");
    let JobOptions::Pull(opts) = job.options() else {
        panic!("expected pull options");
    };
    assert_eq!(opts.credentials().map(|c| c.user.as_str()), Some("alice"));

    let report = sched.start_jobs().await;
    assert!(report.is_clean());
    assert_eq!(repo.status(), WorkStatus::Success);
}

#[tokio::test]
async fn test_resubmit_credentials_reach_requeued_job() {
    let (sched, native, _) = scheduler(FakeNative::new(), 2);
    native.script_pull(Err(NativeError::AuthenticationRequired));
    let repo = fake_repo("alpha", URL);
    sched.add_job(Job::new(JobKind::Pull, repo.clone())).unwrap();
    sched.start_jobs().await;
    assert_eq!(repo.status(), WorkStatus::Paused);

    sched.add_job(Job::new(JobKind::Pull, repo.clone())).unwrap();
    sched
        .resubmit(&repo, &Credentials::new("alice", "s3cret"))
        .unwrap();

    assert_eq!(repo.status(), WorkStatus::Queued);
    assert!(sched.failover().is_empty());
    assert_eq!(sched.queue().len(), 1);
    let job = sched.is_in_the_queue(&repo).expect("pull still queued");
    let JobOptions::Pull(opts) = job.options() else {
        panic!("expected pull options");
    };
    assert_eq!(opts.credentials().map(|c| c.user.as_str()), Some("alice"));

    let report = sched.start_jobs().await;
    assert!(report.is_clean());
    assert_eq!(repo.status(), WorkStatus::Success);
}

#[test]
fn test_resubmit_unknown_repository_changes_nothing() {
    let (sched, _, _) = scheduler(FakeNative::new(), 1);
    let repo = fake_repo("alpha", URL);
    sched.add_job(Job::new(JobKind::Fetch, repo.clone())).unwrap();

    let err = sched
        .resubmit(&repo, &Credentials::new("alice", "s3cret"))
        .unwrap_err();

    assert!(matches!(err, QueueError::NotInQueue { .. }));
    assert_eq!(repo.status(), WorkStatus::Queued);
    assert_eq!(sched.queue().len(), 1);
}

#[tokio::test]
async fn test_failure_is_recorded_and_batch_continues() {
    let (sched, native, external) = scheduler(FakeNative::new(), 1);
    native.script_fetch(Err(NativeError::Other("transport hiccup".into())));
    external.script(128, "ERROR: Repository not found.");
    let broken = fake_repo("broken", URL);
    let fine = fake_repo("fine", URL);
    sched.add_job(Job::new(JobKind::Fetch, broken.clone())).unwrap();

    let report = sched.start_jobs().await;
    assert_eq!(broken.status(), WorkStatus::Fail);
    assert_eq!(broken.message().as_deref(), Some("remote not found"));
    let (key, err) = report.failed.iter().next().expect("one failure");
    assert_eq!(key.name, "broken");
    assert_eq!(err.kind(), ErrorKind::RemoteNotFound);

    sched.add_job(Job::new(JobKind::Fetch, fine.clone())).unwrap();
    sched.add_job(Job::new(JobKind::Fetch, broken.clone())).unwrap();
    let report = sched.start_jobs().await;
    assert!(report.is_clean());
    assert_eq!(broken.status(), WorkStatus::Success);
    assert_eq!(broken.message(), None);
}

#[tokio::test]
async fn test_two_repositories_same_kind_both_succeed() {
    let (sched, _, _) = scheduler(FakeNative::new(), 4);
    let alpha = fake_repo("alpha", URL);
    let beta = fake_repo("beta", URL);
    sched.add_job(Job::new(JobKind::Fetch, alpha.clone())).unwrap();
    sched.add_job(Job::new(JobKind::Fetch, beta.clone())).unwrap();

    let report = sched.start_jobs().await;

    assert!(report.failed.is_empty());
    assert_eq!(report.attempted(), 2);
    assert_eq!(alpha.status(), WorkStatus::Success);
    assert_eq!(beta.status(), WorkStatus::Success);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_repository_jobs_never_overlap() {
    let (sched, native, _) = scheduler(FakeNative::with_delay(Duration::from_millis(30)), 4);
    native.script_merge(Ok(NativeOutcome::UpToDate));
    let repo = fake_repo("alpha", URL);
    for kind in [JobKind::Fetch, JobKind::Pull, JobKind::Merge] {
        sched.add_job(Job::new(kind, repo.clone())).unwrap();
    }

    let report = sched.start_jobs().await;

    assert_eq!(report.succeeded.len(), 3);
    assert_eq!(native.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(repo.status(), WorkStatus::Success);
}

#[tokio::test]
async fn test_closed_scheduler_leaves_jobs_queued() {
    let (sched, native, _) = scheduler(FakeNative::new(), 2);
    let repo = fake_repo("alpha", URL);
    sched.add_job(Job::new(JobKind::Fetch, repo.clone())).unwrap();

    sched.close();
    let report = sched.start_jobs().await;

    assert_eq!(report.unscheduled.len(), 1);
    assert!(matches!(report.interrupted, Some(QueueError::SlotUnavailable(_))));
    assert!(!report.is_clean());
    assert_eq!(repo.status(), WorkStatus::Queued);
    assert!(sched.queue().contains(repo.id()));
    assert!(native.calls().is_empty());
}
