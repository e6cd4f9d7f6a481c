use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn jobpipe() -> Command {
    Command::cargo_bin("jobpipe").unwrap()
}

#[test]
fn sync_writes_the_manifest_and_creates_the_layout() {
    let temp = TempDir::new().unwrap();

    jobpipe()
        .current_dir(temp.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("updated"));

    let manifest = fs::read_to_string(temp.path().join("pipeline.yaml")).unwrap();
    assert!(manifest.contains("get_mail:"));
    assert!(manifest.contains("jobpipe stage convert"));
    assert!(temp.path().join("data/mboxes").is_dir());
    assert!(temp.path().join("docs/notebooks").is_dir());
}

#[test]
fn sync_reports_up_to_date_the_second_time() {
    let temp = TempDir::new().unwrap();

    jobpipe().current_dir(temp.path()).arg("sync").assert().success();
    jobpipe()
        .current_dir(temp.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn get_mail_writes_alerts_from_an_mbox() {
    let temp = TempDir::new().unwrap();
    let mboxes = temp.path().join("data/mboxes");
    fs::create_dir_all(&mboxes).unwrap();
    fs::write(
        mboxes.join("inbox.mbox"),
        "\
From 1234567890@xxx Mon Feb 02 10:00:00 2026
From: Job Alerts from Google <notify-noreply@google.com>
Date: Mon, 02 Feb 2026 10:00:00 +0000
Subject: 2 new jobs

Rust Engineer - Acme
",
    )
    .unwrap();

    jobpipe()
        .current_dir(temp.path())
        .args(["stage", "get-mail"])
        .assert()
        .success();

    let mail = fs::read_to_string(temp.path().join("data/mail.json")).unwrap();
    assert!(mail.contains("2 new jobs"));
}

#[test]
fn stage_paths_survive_an_explicit_root() {
    let temp = TempDir::new().unwrap();

    jobpipe()
        .args(["sync", "--root"])
        .arg(temp.path())
        .assert()
        .success();

    assert!(temp.path().join("pipeline.yaml").exists());
    assert!(temp.path().join("data").is_dir());
}

#[test]
fn convert_runs_the_configured_notebook_runner() {
    let temp = TempDir::new().unwrap();

    jobpipe()
        .current_dir(temp.path())
        .env("JOBPIPE_NB_RUNNER", "touch")
        .args(["stage", "convert"])
        .assert()
        .success();

    // The stub runner created the notebook it was asked to execute.
    assert!(temp.path().join("docs/notebooks/convert.ipynb").is_file());
}
