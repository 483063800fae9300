// gitbatch-rs: Batch Git Repository Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the command line and quick mode.

mod common;

use clap::Parser;
use common::{Fixture, git, path_str};
use gitbatch_rs::cli::Cli;
use gitbatch_rs::cmd::batch::run_batch;
use gitbatch_rs::cmd::list::list_repositories;
use gitbatch_rs::queue::JobKind;

fn config_for(args: &[&str]) -> gitbatch_rs::config::Config {
    let cli = Cli::try_parse_from(std::iter::once("gitbatch").chain(args.iter().copied()))
        .expect("valid arguments");
    cli.config_loader().unwrap().build().unwrap()
}

#[test]
fn cli_list_reports_branch_and_divergence() {
    let fixture = Fixture::new();
    fixture.clone_as("alpha");
    let beta = fixture.clone_as("beta");
    git(&beta, &["commit", "-q", "--allow-empty", "-m", "local only"]);

    let work = fixture.work_dir();
    let config = config_for(&["-d", path_str(&work)]);
    let lines = list_repositories(&config).unwrap();

    let rows: Vec<String> = lines.iter().map(|l| l.branch_row(5)).collect();
    insta::assert_snapshot!(rows.join("\n"), @r"
    alpha  main  ↑0 ↓0
    beta   main  ↑1 ↓0
    ");
}

#[test]
fn cli_depth_limits_discovery() {
    let fixture = Fixture::new();
    fixture.clone_as("alpha");
    let nested = fixture.work_dir().join("group");
    std::fs::create_dir_all(&nested).unwrap();
    git(&nested, &["clone", "-q", path_str(&fixture.remote), "deep"]);

    let root = fixture.temp.path().to_path_buf();
    let shallow = config_for(&["-d", path_str(&root), "-r", "2"]);
    let deep = config_for(&["-d", path_str(&root), "-r", "3"]);

    let names = |config: &gitbatch_rs::config::Config| -> Vec<String> {
        let mut names: Vec<String> = list_repositories(config)
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        names.sort();
        names
    };
    assert_eq!(names(&shallow), vec!["alpha", "seed"]);
    assert_eq!(names(&deep), vec!["alpha", "deep", "seed"]);
}

#[tokio::test]
async fn cli_quick_mode_fetch_reports_each_repository() {
    let fixture = Fixture::new();
    fixture.clone_as("alpha");
    let broken = fixture.clone_as("broken");
    let missing = fixture.temp.path().join("gone.git");
    git(&broken, &["remote", "set-url", "origin", path_str(&missing)]);
    fixture.publish("README", "v2\n", "second");

    let work = fixture.work_dir();
    let config = config_for(&["-d", path_str(&work), "-m", "fetch", "-j", "2", "--external"]);
    let (report, lines) = run_batch(JobKind::Fetch, &config, false).await.unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failed.len(), 1);

    let summary: Vec<(String, String, String)> = lines
        .iter()
        .map(|l| (l.name.clone(), l.status.clone(), l.divergence.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("alpha".into(), "success".into(), "↑0 ↓1".into()),
            ("broken".into(), "fail".into(), "↑0 ↓0".into()),
        ]
    );
    assert_eq!(lines[1].message.as_deref(), Some("unclassified error"));
}
