// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Options shared by every invocation.
//!
//! ```text
//! -c, --config FILE     extra TOML file, after ./gitbatch.toml
//! -l, --log-level N     console verbosity (0-6)
//! --file-log-level N    file verbosity (defaults to --log-level)
//! --log-file FILE       enables the file layer
//!
//! Precedence: CLI flags > GITBATCH_* > --config > ./gitbatch.toml > defaults
//! ```

use std::path::PathBuf;

use clap::Args;

use crate::config::ConfigLoader;
use crate::error::Result;

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Additional TOML configuration file.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Console log level (0=silent, 1=errors, 2=warnings, 3=info, 4=debug, 5=trace, 6=all).
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6))]
    pub log_level: Option<u8>,

    /// File log level, defaults to --log-level.
    #[arg(long = "file-log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6))]
    pub file_log_level: Option<u8>,

    /// Also write logs to FILE.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl GlobalOptions {
    /// Layers these flags over `loader`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be stored.
    pub fn apply(&self, loader: ConfigLoader) -> Result<ConfigLoader> {
        loader
            .set_some("global.output_log_level", self.log_level.map(i64::from))?
            .set_some(
                "global.file_log_level",
                self.file_log_level.or(self.log_level).map(i64::from),
            )?
            .set_some(
                "global.log_file",
                self.log_file.as_ref().map(|p| p.display().to_string()),
            )
    }
}
