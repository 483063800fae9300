// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!              Executor (mode: Native | External, immutable)
//!              fetch pull merge add commit reset diff status
//!               |                 ^                 |
//!               v                 | classify()      v
//!      ,-----------------,        |       ,------------------,
//!      | NativeGit (gix) |--fail--+-----> | ExternalGit (CLI)|
//!      '-----------------'                '------------------'
//!               |                                   |
//!               '---------> Repository::refresh <---'
//! ```
//!
//! **`GixBackend`**: pure Rust, no subprocess; reads plus single-refspec fetch.
//! **`ShellBackend`**: git CLI with combined output, used as fallback and for
//! everything the native side declines.

pub mod auth;
pub mod backend;
pub mod classify;
pub mod executor;
pub mod options;

#[cfg(test)]
pub(crate) mod test_utils;

pub use auth::Credentials;
pub use classify::{classify, is_up_to_date};
pub use executor::{ExecutionMode, Executor};
pub use options::{
    AddFlags, AddOptions, CommitOptions, FetchOptions, MergeOptions, PullOptions, ResetMode,
    ResetOptions,
};
