// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration sections.
//!
//! ```text
//! Config
//!   global  log levels, log file
//!   scan    root directories, depth, symlinks
//!   jobs    concurrency, execution mode
//!   git     git program, default remote
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::git::ExecutionMode;
use crate::git::options::DEFAULT_REMOTE;
use crate::logging::LogLevel;

/// Logging options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    pub output_log_level: LogLevel,
    pub file_log_level: LogLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::WARN,
            file_log_level: LogLevel::DEBUG,
            log_file: None,
        }
    }
}

/// Where repositories are looked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Roots to scan; empty means the current directory.
    pub directories: Vec<PathBuf>,
    /// 1 = each root and its immediate children.
    pub depth: usize,
    pub follow_links: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            depth: 1,
            follow_links: false,
        }
    }
}

impl ScanConfig {
    /// Configured roots, or the current directory when none are set.
    #[must_use]
    pub fn roots(&self) -> Vec<PathBuf> {
        if self.directories.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.directories.clone()
        }
    }
}

/// Batch scheduling options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobsConfig {
    /// Parallel job slots; unset means one per processing unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    pub mode: ExecutionMode,
}

impl JobsConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero concurrency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == Some(0) {
            return Err(ConfigError::InvalidValue {
                section: "jobs".to_string(),
                key: "concurrency".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// External git options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Program name or path used by the external strategy.
    pub program: String,
    /// Remote used when a repository has none selected.
    pub default_remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            default_remote: DEFAULT_REMOTE.to_string(),
        }
    }
}

impl GitConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a field is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("program", &self.program), ("default_remote", &self.default_remote)] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    section: "git".to_string(),
                    key: key.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}
