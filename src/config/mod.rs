// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Layered configuration.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. gitbatch.toml (cwd, optional)
//! 3. --config FILE
//! 4. GITBATCH_* env vars
//! 5. CLI overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! GITBATCH_JOBS__CONCURRENCY=4       → jobs.concurrency = 4
//! GITBATCH_JOBS__MODE=external       → jobs.mode = "external"
//! GITBATCH_GIT__DEFAULT_REMOTE=up    → git.default_remote = "up"
//! ```
//!
//! Sections are separated by a double underscore so that keys may keep
//! their single underscores.

pub mod loader;
pub mod types;


use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use loader::ConfigLoader;
pub use types::{GitConfig, GlobalConfig, JobsConfig, ScanConfig};

/// File picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = "gitbatch.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "GITBATCH";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub global: GlobalConfig,
    pub scan: ScanConfig,
    pub jobs: JobsConfig,
    pub git: GitConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gitbatch_rs::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("gitbatch.toml")
    ///     .with_env_prefix("GITBATCH")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Standard layering: local file, then `explicit`, then environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` is missing, a file is not valid TOML,
    /// or a value fails validation.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::standard_sources(explicit).build()
    }

    /// The loader behind [`Config::load`], for callers adding CLI overrides.
    #[must_use]
    pub fn standard_sources(explicit: Option<&Path>) -> ConfigLoader {
        let loader = Self::builder().add_toml_file_optional(LOCAL_CONFIG_FILE);
        let loader = match explicit {
            Some(path) => loader.add_toml_file(path),
            None => loader,
        };
        loader.with_env_prefix(ENV_PREFIX)
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match
    /// the `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Checks values serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<()> {
        self.jobs.validate()?;
        self.git.validate()?;
        Ok(())
    }

    /// `key = value` lines, sorted by key and aligned.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let fmt_path = |p: &Option<PathBuf>| {
            p.as_ref()
                .map_or_else(String::new, |p| p.display().to_string())
        };
        let mut options = BTreeMap::new();

        options.insert(
            "global.output_log_level",
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level",
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert("global.log_file", fmt_path(&self.global.log_file));

        let directories: Vec<String> = self
            .scan
            .roots()
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        options.insert("scan.directories", directories.join(", "));
        options.insert("scan.depth", self.scan.depth.to_string());
        options.insert("scan.follow_links", self.scan.follow_links.to_string());

        options.insert(
            "jobs.concurrency",
            self.jobs
                .concurrency
                .map_or_else(|| "auto".to_string(), |n| n.to_string()),
        );
        options.insert("jobs.mode", self.jobs.mode.to_string());

        options.insert("git.program", self.git.program.clone());
        options.insert("git.default_remote", self.git.default_remote.clone());

        let width = options.keys().map(|k| k.len()).max().unwrap_or(0);
        options
            .into_iter()
            .map(|(key, value)| {
                if value.is_empty() {
                    format!("{key:<width$} =")
                } else {
                    format!("{key:<width$} = {value}")
                }
            })
            .collect()
    }
}
