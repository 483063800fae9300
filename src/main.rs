// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Dispatch
//!   options | configs | list (no -m) | batch (-m OP)
//! ```

use std::process::ExitCode;

use gitbatch_rs::cli::{self, Cli, Command};
use gitbatch_rs::cmd::batch::run_batch_command;
use gitbatch_rs::cmd::list::run_list_command;
use gitbatch_rs::config::Config;
use gitbatch_rs::logging::{LogConfig, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let loader = match cli.config_loader() {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    if cli.command == Some(Command::Configs) {
        print_lines(&loader.format_loaded_files(), "No configuration files loaded");
        return ExitCode::SUCCESS;
    }

    let config = match loader.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match init_logging(&build_log_config(&config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &config).await
}

fn build_log_config(config: &Config) -> LogConfig {
    LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(config.global.log_file.clone())
        .build()
}

async fn dispatch_command(cli: &Cli, config: &Config) -> ExitCode {
    let result = match (cli.command, cli.batch.mode) {
        (Some(Command::Options), _) => {
            print_lines(&config.format_options(), "");
            Ok(true)
        }
        (Some(Command::Configs), _) => Ok(true),
        (None, Some(kind)) => run_batch_command(kind, config, cli.batch.json).await,
        (None, None) => run_list_command(config, cli.batch.json).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_lines(lines: &[String], empty: &str) {
    if lines.is_empty() {
        if !empty.is_empty() {
            println!("{empty}");
        }
    } else {
        for line in lines {
            println!("{line}");
        }
    }
}
