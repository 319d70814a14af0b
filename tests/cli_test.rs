//! CLI smoke tests
//!
//! Run the `csvchat` binary for paths that finish before any network call.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn csvchat(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("csvchat").unwrap();
    cmd.env_remove("CSVCHAT_API_URL")
        .env_remove("CSVCHAT_API_ORIGIN")
        .env_remove("CSVCHAT_IDLE_TIMEOUT_SECONDS")
        .arg("--config")
        .arg(config_dir.path().join("config.yaml"));
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    csvchat(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("conversations"));
}

#[test]
fn test_upload_rejects_non_csv_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "not a table").unwrap();

    csvchat(&dir)
        .arg("--api-url")
        .arg("http://127.0.0.1:9/api")
        .arg("upload")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please upload a CSV file."));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        "stream:\n  idle_timeout_seconds: 0\n",
    )
    .unwrap();

    csvchat(&dir)
        .arg("conversations")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("idle_timeout_seconds"));
}

#[test]
fn test_session_and_file_conflict() {
    let dir = TempDir::new().unwrap();
    csvchat(&dir)
        .args(["chat", "--session", "s-1", "--file", "data.csv"])
        .assert()
        .failure();
}
