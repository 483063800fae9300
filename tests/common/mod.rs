// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Real repositories for integration tests.
//!
//! ```text
//! temp/
//!   remote.git     bare "server"
//!   seed/          clone used to publish new commits
//!   work/<name>/   clones the batch operates on
//! ```

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Runs git and returns its combined output, panicking on failure.
pub fn git(cwd: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("LC_ALL", "C")
        .env("GIT_TERMINAL_PROMPT", "0")
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@test.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@test.com")
        .output()
        .expect("git should spawn");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(out.status.success(), "git {args:?} failed: {text}");
    text
}

/// Commits `content` to `file` in `repo`.
pub fn commit_file(repo: &Path, file: &str, content: &str, message: &str) {
    fs::write(repo.join(file), content).unwrap();
    git(repo, &["add", file]);
    git(repo, &["commit", "-q", "-m", message]);
}

/// A bare remote with one published commit.
pub struct Fixture {
    pub temp: TempDir,
    pub remote: PathBuf,
    seed: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("failed to create temp dir");
        let remote = temp.path().join("remote.git");
        let seed = temp.path().join("seed");

        git(temp.path(), &["init", "-q", "--bare", "-b", "main", "remote.git"]);
        git(temp.path(), &["clone", "-q", path_str(&remote), "seed"]);
        git(&seed, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        configure_identity(&seed);
        commit_file(&seed, "README", "v1\n", "initial import");
        git(&seed, &["push", "-q", "origin", "main"]);

        Self { temp, remote, seed }
    }

    /// Root the batch scans.
    pub fn work_dir(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    /// Clones the remote into `work/<name>`.
    pub fn clone_as(&self, name: &str) -> PathBuf {
        let work = self.work_dir();
        fs::create_dir_all(&work).unwrap();
        git(&work, &["clone", "-q", path_str(&self.remote), name]);
        let path = work.join(name);
        configure_identity(&path);
        path
    }

    /// Publishes a new commit to the remote.
    pub fn publish(&self, file: &str, content: &str, message: &str) {
        commit_file(&self.seed, file, content, message);
        git(&self.seed, &["push", "-q", "origin", "main"]);
    }
}

fn configure_identity(repo: &Path) {
    git(repo, &["config", "user.name", "Test"]);
    git(repo, &["config", "user.email", "test@test.com"]);
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

pub fn read(path: &Path, file: &str) -> String {
    fs::read_to_string(path.join(file)).unwrap()
}
