// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! One-time directory scan for repositories.
//!
//! ```text
//! ~/src            depth 0  (a repo itself? included)
//!   alpha/.git     depth 1  included, not descended
//!   tools/         depth 1  plain dir, descended if depth allows
//!     beta/.git    depth 2
//!   .cache/        hidden, skipped
//! ```
//!
//! Returns sorted, de-duplicated absolute paths.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;
use tracing::{debug, warn};

use super::Repository;
use super::events::EventBus;
use crate::git::backend::NativeGit;

/// Whether `path` holds a `.git` directory or gitlink file.
#[must_use]
pub fn is_repository(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Walker over plain directories that never descends below a repository
/// root. `.git` and other hidden entries are skipped.
pub(super) fn build_walker(root: &Path, depth: usize, follow_links: bool) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder
        .max_depth(Some(depth))
        .follow_links(follow_links)
        .hidden(true)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    // Evaluated before descending.
    builder.filter_entry(|entry| {
        entry.depth() == 0 || !entry.path().parent().is_some_and(is_repository)
    });
    builder
}

/// Scans `roots` down to `depth` levels below each root.
///
/// Unreadable roots and entries are logged and skipped.
#[must_use]
pub fn discover_repositories(roots: &[PathBuf], depth: usize, follow_links: bool) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = Vec::new();

    for root in roots {
        let root = match std::fs::canonicalize(root) {
            Ok(root) => root,
            Err(e) => {
                warn!(path = %root.display(), error = %e, "skipping scan root");
                continue;
            }
        };

        let walker = build_walker(&root, depth, follow_links).build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "scan error");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_dir()) {
                continue;
            }
            let path = entry.path();
            if is_repository(path) {
                debug!(path = %path.display(), "found repository");
                found.push(path.to_path_buf());
            }
        }
    }

    found.sort();
    found.dedup();
    found
}

/// Opens every path, logging and skipping the ones that cannot be read.
pub fn load_repositories(
    paths: &[PathBuf],
    native: &dyn NativeGit,
    events: &EventBus,
) -> Vec<Arc<Repository>> {
    paths
        .iter()
        .filter_map(|path| match Repository::open(path, native, events.clone()) {
            Ok(repo) => Some(repo),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot open repository");
                None
            }
        })
        .collect()
}
