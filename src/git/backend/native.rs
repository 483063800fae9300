// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pure Rust backend on top of gix.
//!
//! Reads (snapshot, status, config) are complete. Fetch is complete for a
//! single computed refspec. Pull and merge only recognise the up-to-date
//! case and decline everything that would touch the working tree.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use gix::ObjectId;
use gix::remote::Direction;
use tracing::{debug, trace};

use super::{FetchRequest, NativeError, NativeGit, NativeOutcome, PullRequest};
use crate::git::auth::Credentials;
use crate::repository::model::{
    Branch, Commit, Divergence, Remote, RemoteBranch, RepoSnapshot, StashEntry,
};

/// Pure Rust git backend using gix.
#[derive(Debug, Clone, Copy, Default)]
pub struct GixBackend;

fn other(err: impl Display) -> NativeError {
    NativeError::Other(err.to_string())
}

fn open(path: &Path) -> Result<gix::Repository, NativeError> {
    gix::open(path).map_err(|e| NativeError::Other(format!("not a git repository: {e}")))
}

/// Flattens an error and its sources into one line and sorts it into a
/// `NativeError` variant.
fn transport_failure(err: &(dyn std::error::Error + 'static)) -> NativeError {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }

    let lower = text.to_ascii_lowercase();
    if lower.contains("matched any of the") || lower.contains("couldn't find remote ref") {
        NativeError::RemoteRefNotFound(text)
    } else if lower.contains("permission denied") || lower.contains("403") {
        NativeError::AuthorizationFailed(text)
    } else if lower.contains("authentication") || lower.contains("credential") || lower.contains("401") {
        NativeError::AuthenticationRequired
    } else {
        NativeError::Other(text)
    }
}

fn is_ssh_url(url: &str) -> bool {
    url.starts_with("ssh://")
        || url.starts_with("git+ssh://")
        || (!url.contains("://") && url.contains('@') && url.contains(':'))
}

/// Tip of every `refs/remotes/<remote>/*` reference.
fn tracking_tips(
    repo: &gix::Repository,
    remote: &str,
) -> Result<BTreeMap<String, ObjectId>, NativeError> {
    let prefix = format!("{remote}/");
    let platform = repo.references().map_err(other)?;
    let mut tips = BTreeMap::new();
    for reference in platform.remote_branches().map_err(other)? {
        let reference = reference.map_err(other)?;
        let name = reference.name().shorten().to_string();
        if !name.starts_with(&prefix) {
            continue;
        }
        if let Some(id) = reference.try_id() {
            tips.insert(name, id.detach());
        }
    }
    Ok(tips)
}

fn count_exclusive(
    repo: &gix::Repository,
    tip: ObjectId,
    hidden: ObjectId,
) -> Result<usize, NativeError> {
    let walk = repo
        .rev_walk([tip])
        .with_hidden([hidden])
        .all()
        .map_err(other)?;
    let mut count = 0;
    for info in walk {
        info.map_err(other)?;
        count += 1;
    }
    Ok(count)
}

/// Upstream short name and its tip, from `branch.<name>.remote/merge`.
fn upstream_of(repo: &gix::Repository, branch: &str) -> Option<(String, Option<ObjectId>)> {
    let config = repo.config_snapshot();
    let remote = config.string(format!("branch.{branch}.remote").as_str())?.to_string();
    let merge = config.string(format!("branch.{branch}.merge").as_str())?.to_string();
    let merged = merge.strip_prefix("refs/heads/").unwrap_or(&merge);

    let short = format!("{remote}/{merged}");
    let tip = repo
        .find_reference(format!("refs/remotes/{short}").as_str())
        .ok()
        .and_then(|r| r.try_id().map(gix::Id::detach));
    Some((short, tip))
}

fn has_changes(repo: &gix::Repository) -> Result<bool, NativeError> {
    use gix::status::UntrackedFiles;

    let has_changes = repo
        .status(gix::progress::Discard)
        .map_err(other)?
        .untracked_files(UntrackedFiles::Files)
        .into_iter(None)
        .map_err(other)?
        .next()
        .is_some();
    Ok(has_changes)
}

fn local_branches(repo: &gix::Repository, head: Option<&str>) -> Result<Vec<Branch>, NativeError> {
    let platform = repo.references().map_err(other)?;
    let mut branches = Vec::new();
    for reference in platform.local_branches().map_err(other)? {
        let reference = reference.map_err(other)?;
        let Some(id) = reference.try_id().map(gix::Id::detach) else {
            continue;
        };
        let mut branch = Branch::new(reference.name().shorten().to_string(), id.to_string());

        if let Some((upstream, tip)) = upstream_of(repo, &branch.name) {
            branch.divergence = match tip {
                Some(tip) => Some(Divergence::new(
                    count_exclusive(repo, id, tip)?,
                    count_exclusive(repo, tip, id)?,
                )),
                None => None,
            };
            branch.upstream = Some(upstream);
        }

        if head == Some(branch.name.as_str()) {
            branch.clean = match has_changes(repo) {
                Ok(dirty) => !dirty,
                Err(e) => {
                    debug!(error = %e, "status unavailable, assuming clean");
                    true
                }
            };
        }
        branches.push(branch);
    }
    Ok(branches)
}

fn remotes(repo: &gix::Repository) -> Result<Vec<Remote>, NativeError> {
    let mut remotes = Vec::new();
    for name in repo.remote_names() {
        let name = name.to_string();
        let remote = repo.find_remote(name.as_str()).map_err(other)?;

        let mut urls = Vec::new();
        for direction in [Direction::Fetch, Direction::Push] {
            if let Some(url) = remote.url(direction) {
                let url = url.to_bstring().to_string();
                if !urls.contains(&url) {
                    urls.push(url);
                }
            }
        }
        let refspecs = remote
            .refspecs(Direction::Fetch)
            .iter()
            .map(|spec| spec.to_ref().to_bstring().to_string())
            .collect();
        let branches = tracking_tips(repo, &name)?
            .into_iter()
            .map(|(name, id)| RemoteBranch {
                name,
                hash: id.to_string(),
            })
            .collect();

        remotes.push(Remote::new(name, urls, refspecs).with_branches(branches));
    }
    Ok(remotes)
}

fn head_commit(repo: &gix::Repository) -> Result<Option<Commit>, NativeError> {
    let Ok(commit) = repo.head_commit() else {
        return Ok(None);
    };
    let author = commit.author().map_err(other)?;
    let message = commit.message().map_err(other)?;
    Ok(Some(Commit {
        hash: commit.id.to_string(),
        author: author.name.to_string(),
        summary: message.summary().to_string(),
        time: commit.time().map_err(other)?.seconds,
    }))
}

fn stashes(repo: &gix::Repository) -> Result<Vec<StashEntry>, NativeError> {
    let Ok(reference) = repo.find_reference("refs/stash") else {
        return Ok(Vec::new());
    };
    let mut log = reference.log_iter();
    let Some(lines) = log.all().map_err(other)? else {
        return Ok(Vec::new());
    };
    let mut messages = Vec::new();
    for line in lines {
        messages.push(line.map_err(other)?.message.to_string());
    }
    // The reflog is oldest-first; stash@{0} is the newest.
    Ok(messages
        .into_iter()
        .rev()
        .enumerate()
        .map(|(index, message)| StashEntry { index, message })
        .collect())
}

fn fast_forward_state(
    repo: &gix::Repository,
    local: ObjectId,
    target: ObjectId,
) -> Result<NativeOutcome, NativeError> {
    if local == target {
        return Ok(NativeOutcome::UpToDate);
    }
    let base = repo.merge_base(local, target).map_err(other)?.detach();
    if base == target {
        Ok(NativeOutcome::UpToDate)
    } else {
        Err(NativeError::Unsupported("updating the working tree".to_string()))
    }
}

fn fetch_with(
    repo: &gix::Repository,
    remote_name: &str,
    refspec: &str,
    credentials: Option<&Credentials>,
) -> Result<(), NativeError> {
    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|e| NativeError::Other(format!("remote not found: {e}")))?;

    if let Some(url) = remote.url(Direction::Fetch).map(|u| u.to_bstring().to_string())
        && is_ssh_url(&url)
        && std::env::var_os("SSH_AUTH_SOCK").is_none()
    {
        return Err(NativeError::SshAgentMissing(
            "SSH_AUTH_SOCK not specified".to_string(),
        ));
    }

    remote
        .replace_refspecs([refspec], Direction::Fetch)
        .map_err(other)?;

    let mut connection = remote
        .connect(Direction::Fetch)
        .map_err(|e| transport_failure(&e))?;
    if let Some(credentials) = credentials.cloned() {
        connection = connection.with_credentials(move |action| match action {
            gix::credentials::helper::Action::Get(ctx) => {
                Ok(Some(gix::credentials::protocol::Outcome {
                    identity: gix::sec::identity::Account {
                        username: credentials.user.clone(),
                        password: credentials.password.clone(),
                        oauth_refresh_token: None,
                    },
                    next: ctx.into(),
                }))
            }
            _ => Ok(None),
        });
    }

    let interrupt = AtomicBool::new(false);
    connection
        .prepare_fetch(gix::progress::Discard, gix::remote::ref_map::Options::default())
        .map_err(|e| transport_failure(&e))?
        .receive(gix::progress::Discard, &interrupt)
        .map_err(|e| transport_failure(&e))?;
    Ok(())
}

impl NativeGit for GixBackend {
    fn snapshot(&self, path: &Path) -> Result<RepoSnapshot, NativeError> {
        let repo = open(path)?;
        let head = repo
            .head_name()
            .map_err(other)?
            .map(|name| name.shorten().to_string());

        let snapshot = RepoSnapshot {
            branches: local_branches(&repo, head.as_deref())?,
            remotes: remotes(&repo)?,
            commit: head_commit(&repo)?,
            stashes: stashes(&repo)?,
            head,
        };
        trace!(
            path = %path.display(),
            branches = snapshot.branches.len(),
            remotes = snapshot.remotes.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    fn fetch(&self, path: &Path, request: &FetchRequest) -> Result<NativeOutcome, NativeError> {
        let repo = open(path)?;
        let before = tracking_tips(&repo, &request.remote)?;
        fetch_with(
            &repo,
            &request.remote,
            &request.refspec,
            request.credentials.as_ref(),
        )?;
        let after = tracking_tips(&open(path)?, &request.remote)?;

        if before == after {
            Ok(NativeOutcome::UpToDate)
        } else {
            Ok(NativeOutcome::Updated)
        }
    }

    fn pull(&self, path: &Path, request: &PullRequest) -> Result<NativeOutcome, NativeError> {
        let repo = open(path)?;
        fetch_with(
            &repo,
            &request.remote,
            &request.refspec,
            request.credentials.as_ref(),
        )?;

        let repo = open(path)?;
        let local = repo
            .head_id()
            .map_err(|_| NativeError::Unsupported("pull into an unborn branch".to_string()))?
            .detach();
        let tracking = format!("refs/remotes/{}/{}", request.remote, request.branch);
        let target = repo
            .find_reference(tracking.as_str())
            .ok()
            .and_then(|r| r.try_id().map(gix::Id::detach))
            .ok_or(NativeError::StaleReference(tracking))?;

        fast_forward_state(&repo, local, target)
    }

    fn merge(&self, path: &Path, branch: &str) -> Result<NativeOutcome, NativeError> {
        let repo = open(path)?;
        let local = repo
            .head_id()
            .map_err(|_| NativeError::Unsupported("merge into an unborn branch".to_string()))?
            .detach();
        let target = repo
            .rev_parse_single(branch)
            .map_err(|e| NativeError::Other(format!("unable to resolve reference '{branch}': {e}")))?
            .detach();

        fast_forward_state(&repo, local, target)
    }

    fn status(&self, path: &Path) -> Result<Vec<String>, NativeError> {
        use gix::status::UntrackedFiles;

        let repo = open(path)?;
        let iter = repo
            .status(gix::progress::Discard)
            .map_err(other)?
            .untracked_files(UntrackedFiles::Files)
            .into_iter(None)
            .map_err(other)?;

        let mut paths = Vec::new();
        for item in iter {
            let location = item.map_err(other)?.location().to_string();
            if !paths.contains(&location) {
                paths.push(location);
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn config_get(&self, path: &Path, key: &str) -> Result<Option<String>, NativeError> {
        let repo = open(path)?;
        Ok(repo.config_snapshot().string(key).map(|value| value.to_string()))
    }
}
