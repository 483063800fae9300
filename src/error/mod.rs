// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!            GitBatchError (~24 bytes)
//!                     |
//!   +--------+--------+--------+--------+
//!   |        |        |        |        |
//!   v        v        v        v        v
//!  Git     Queue    Config  Process  Io/Other
//!  Box      Box      Box      Box    Box<str>
//!
//! GitError = ErrorKind + detail
//!   ErrorKind  closed taxonomy from git::classify
//! QueueError   AlreadyQueued, NotInQueue, InvalidTransition, SlotUnavailable
//! ConfigError  ParseError, MissingKey, InvalidValue
//! ProcessError ExecutableNotFound, SpawnFailed
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`GitBatchError`].
pub type BatchResult<T> = std::result::Result<T, GitBatchError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum GitBatchError {
    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Job queue or scheduler error.
    #[error("queue error: {0}")]
    Queue(#[from] Box<QueueError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for GitBatchError {
                fn from(err: $error) -> Self {
                    GitBatchError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GitError => Git,
    QueueError => Queue,
    ConfigError => Config,
    ProcessError => Process,
    std::io::Error => Io,
}

// --- Error taxonomy ---

/// Closed classification of git operation failures.
///
/// Produced by [`crate::git::classify`] for external output and by the
/// executor for native failures. `AlreadyUpToDate` is a success outcome and
/// never reaches a repository as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ErrorKind {
    GitCommandFailed,
    AuthenticationRequired,
    AuthorizationFailed,
    InvalidAuthMethod,
    AlreadyUpToDate,
    CouldNotFindRemoteRef,
    MergeAbortedLocalChanges,
    RemoteBranchNotSpecified,
    RemoteNotFound,
    ConflictAfterMerge,
    UnmergedFiles,
    ReferenceBroken,
    UserIdentityNotConfigured,
    Unclassified,
}

impl ErrorKind {
    /// Short human-readable message stored on the repository.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::GitCommandFailed => "git command returned error",
            Self::AuthenticationRequired => "authentication required",
            Self::AuthorizationFailed => "authorization failed",
            Self::InvalidAuthMethod => "invalid auth method",
            Self::AlreadyUpToDate => "already up to date",
            Self::CouldNotFindRemoteRef => "couldn't find remote ref",
            Self::MergeAbortedLocalChanges => "stash/commit changes. aborted",
            Self::RemoteBranchNotSpecified => "upstream branch not specified",
            Self::RemoteNotFound => "remote not found",
            Self::ConflictAfterMerge => "conflict while merging",
            Self::UnmergedFiles => "unmerged files detected",
            Self::ReferenceBroken => "error reading reference",
            Self::UserIdentityNotConfigured => "user identity not configured",
            Self::Unclassified => "unclassified error",
        }
    }

    /// Whether this kind represents a successful outcome.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::AlreadyUpToDate)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// --- Git Errors ---

/// Classified error returned by the command executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct GitError {
    kind: ErrorKind,
    detail: String,
}

impl GitError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Returns the classified kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the raw detail (command output or native error text).
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    #[must_use]
    pub const fn is_auth_required(&self) -> bool {
        matches!(self.kind, ErrorKind::AuthenticationRequired)
    }
}

// --- Queue Errors ---

/// Job queue and scheduler errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// A job of the same operation already exists for the repository.
    #[error("'{repo}' already has a queued {operation} job")]
    AlreadyQueued { repo: String, operation: String },

    /// No job references the repository.
    #[error("'{repo}' is not in the queue")]
    NotInQueue { repo: String },

    /// The repository's work status does not permit the transition.
    #[error("'{repo}' cannot move from {from} to {to}")]
    InvalidTransition {
        repo: String,
        from: String,
        to: String,
    },

    /// The scheduler could not obtain a concurrency slot.
    #[error("no concurrency slot available: {0}")]
    SlotUnavailable(String),
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Process Errors ---

/// External process errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
