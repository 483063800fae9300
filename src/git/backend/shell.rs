// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git CLI backend.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use super::{CommandOutput, ExternalGit};
use crate::error::ProcessError;

/// Shell-based git backend using the git CLI.
///
/// Always sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0` so a
/// missing credential fails instead of blocking the batch, and `LC_ALL=C`
/// so output matches the classifier's English rules.
#[derive(Debug, Clone)]
pub struct ShellBackend {
    program: PathBuf,
}

impl Default for ShellBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellBackend {
    /// Uses `git` from `PATH`, resolved when a command runs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }

    /// Uses an explicit executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolves `name` through `PATH` once, up front.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::ExecutableNotFound` if `name` is not on `PATH`.
    pub fn locate(name: &str) -> Result<Self, ProcessError> {
        which::which(name)
            .map(Self::with_program)
            .map_err(|_| ProcessError::ExecutableNotFound {
                name: name.to_string(),
            })
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl ExternalGit for ShellBackend {
    fn run(&self, cwd: &Path, args: &[String]) -> Result<CommandOutput, ProcessError> {
        let command_line = format!("{} {}", self.program.display(), args.join(" "));
        debug!(cwd = %cwd.display(), cmd = %command_line, "exec");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProcessError::SpawnFailed {
                command: command_line.clone(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&stderr);
        }

        let code = output.status.code();
        trace!(cmd = %command_line, ?code, "completed");
        Ok(CommandOutput {
            code,
            output: combined.trim_end().to_string(),
        })
    }
}
