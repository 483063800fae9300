// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command line, via clap derive.
//!
//! ```text
//! gitbatch [global options] [-d DIR]... [-r DEPTH] [-m fetch|pull|merge]
//!          [-j N] [--external] [--json] [command]
//!
//!   no -m       list discovered repositories
//!   -m OP       quick mode: run OP on every repository, print results
//!   options     print the effective configuration
//!   configs     print the configuration files that were loaded
//! ```

pub mod global;


use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::cli::global::GlobalOptions;
use crate::config::{Config, ConfigLoader};
use crate::error::Result;
use crate::queue::JobKind;

/// Batch fetch/pull/merge across many local git repositories.
#[derive(Debug, Parser)]
#[command(
    name = "gitbatch",
    author,
    version,
    about = "Batch fetch/pull/merge across many local git repositories",
    long_about = "gitbatch-rs Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Scans the given directories for git repositories and runs\n\
                  one operation on all of them in parallel. Without --mode the\n\
                  repositories are only listed.",
    after_help = "CONFIGURATION:\n\n\
                  gitbatch reads `gitbatch.toml` from the current directory if it\n\
                  exists, then the file given with --config, then GITBATCH_*\n\
                  environment variables (for example GITBATCH_JOBS__CONCURRENCY=4).\n\
                  Command line flags override all of them."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(flatten)]
    pub batch: BatchOptions,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options of the scan-and-run mode.
#[derive(Debug, Clone, Default, Args)]
pub struct BatchOptions {
    /// Directory to scan for repositories. Can be repeated.
    #[arg(short = 'd', long = "directory", value_name = "DIR", action = clap::ArgAction::Append)]
    pub directories: Vec<PathBuf>,

    /// How deep to look below each directory.
    #[arg(short = 'r', long = "recursion", value_name = "DEPTH")]
    pub depth: Option<usize>,

    /// Operation to run on every repository.
    #[arg(short = 'm', long = "mode", value_name = "OPERATION", value_enum)]
    pub mode: Option<JobKind>,

    /// Maximum number of parallel jobs.
    #[arg(short = 'j', long = "jobs", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: Option<u32>,

    /// Always use the git executable instead of the built-in implementation.
    #[arg(long)]
    pub external: bool,

    /// Print results as JSON lines.
    #[arg(long)]
    pub json: bool,
}

impl BatchOptions {
    /// Layers these flags over `loader`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be stored.
    pub fn apply(&self, loader: ConfigLoader) -> Result<ConfigLoader> {
        let mut loader = loader
            .set_some("scan.depth", self.depth.map(|d| i64::try_from(d).unwrap_or(i64::MAX)))?
            .set_some("jobs.concurrency", self.jobs.map(i64::from))?;
        if !self.directories.is_empty() {
            let dirs: Vec<String> = self
                .directories
                .iter()
                .map(|d| d.display().to_string())
                .collect();
            loader = loader.set("scan.directories", dirs)?;
        }
        if self.external {
            loader = loader.set("jobs.mode", "external")?;
        }
        Ok(loader)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Prints every option and its effective value.
    Options,
    /// Prints the configuration files that were loaded.
    Configs,
}

impl Cli {
    /// Configuration loader with every source and flag applied, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be stored.
    pub fn config_loader(&self) -> Result<ConfigLoader> {
        let loader = Config::standard_sources(self.global.config.as_deref());
        let loader = self.global.apply(loader)?;
        self.batch.apply(loader)
    }
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}
