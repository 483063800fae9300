// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration loading.

use gitbatch_rs::config::Config;
use gitbatch_rs::git::ExecutionMode;
use gitbatch_rs::logging::LogLevel;

#[test]
fn config_parse_full_file() {
    let toml = r#"
[global]
output_log_level = 4
file_log_level = 5
log_file = "logs/gitbatch.log"

[scan]
directories = ["~/src", "/opt/work"]
depth = 2
follow_links = true

[jobs]
concurrency = 6
mode = "native"

[git]
program = "/usr/local/bin/git"
default_remote = "upstream"
"#;
    let config = Config::parse(toml).unwrap();

    assert_eq!(config.global.output_log_level, LogLevel::DEBUG);
    assert_eq!(config.global.file_log_level, LogLevel::TRACE);
    assert!(config.scan.follow_links);
    assert_eq!(config.scan.roots().len(), 2);
    assert_eq!(config.jobs.concurrency, Some(6));
    assert_eq!(config.jobs.mode, ExecutionMode::Native);
    assert_eq!(config.git.program, "/usr/local/bin/git");
    insta::assert_snapshot!(config.format_options().join("\n"), @r"
    git.default_remote      = upstream
    git.program             = /usr/local/bin/git
    global.file_log_level   = 5
    global.log_file         = logs/gitbatch.log
    global.output_log_level = 4
    jobs.concurrency        = 6
    jobs.mode               = native
    scan.depth              = 2
    scan.directories        = ~/src, /opt/work
    scan.follow_links       = true
    ");
}

#[test]
fn config_empty_file_uses_defaults() {
    let config = Config::parse("").unwrap();
    insta::assert_snapshot!(config.format_options().join("\n"), @r"
    git.default_remote      = origin
    git.program             = git
    global.file_log_level   = 4
    global.log_file         =
    global.output_log_level = 2
    jobs.concurrency        = auto
    jobs.mode               = native
    scan.depth              = 1
    scan.directories        = .
    scan.follow_links       = false
    ");
}

#[test]
fn config_rejects_unknown_section() {
    let err = Config::parse("[paths]\nprefix = \"/build\"\n").unwrap_err();
    assert!(err.to_string().contains("paths"), "{err}");
}

#[test]
fn config_explicit_file_layers_over_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let file = temp.path().join("team.toml");
    std::fs::write(&file, "[jobs]\nmode = \"external\"\n").unwrap();

    let config = Config::load(Some(&file)).unwrap();
    assert_eq!(config.jobs.mode, ExecutionMode::External);
    assert_eq!(config.scan.depth, 1);

    assert!(Config::load(Some(&temp.path().join("absent.toml"))).is_err());
}
