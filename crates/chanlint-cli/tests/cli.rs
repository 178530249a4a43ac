//! Binary-level tests: exit codes and report output of `chanlint`.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const CHANNEL: &str = "{\n\t\"schema_version\": \"3.0.0\",\n\t\"repositories\": [\n\t\t\"./repository.json\"\n\t]\n}\n";

const REPOSITORY: &str = "{\n\t\"schema_version\": \"3.0.0\",\n\t\"packages\": [\n\t\t{\n\t\t\t\"name\": \"Alpha\",\n\t\t\t\"details\": \"https://github.com/owner/Alpha\",\n\t\t\t\"releases\": [\n\t\t\t\t{\n\t\t\t\t\t\"sublime_text\": \"*\",\n\t\t\t\t\t\"tags\": true\n\t\t\t\t}\n\t\t\t]\n\t\t}\n\t]\n}\n";

/// A working directory nested one level down, so each test controls what
/// the parent directory holds.
fn workdir() -> (tempfile::TempDir, std::path::PathBuf) {
    let root = tempfile::tempdir().unwrap();
    let work = root.path().join("work");
    std::fs::create_dir(&work).unwrap();
    (root, work)
}

fn chanlint(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("chanlint").unwrap();
    cmd.current_dir(dir);
    cmd
}

#[test]
fn valid_inputs_pass() {
    let (_root, dir) = workdir();
    std::fs::write(dir.join("channel.json"), CHANNEL).unwrap();
    std::fs::write(dir.join("repository.json"), REPOSITORY).unwrap();

    chanlint(&dir)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("PASSED"))
        .stdout(predicate::str::contains("skipped: repository link check not enabled"));
}

#[test]
fn missing_channel_is_skipped_not_failed() {
    let (_root, dir) = workdir();
    std::fs::write(dir.join("repository.json"), REPOSITORY).unwrap();

    chanlint(&dir)
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "skipped: channel check skipped: \"channel.json\" does not exist",
        ));
}

#[test]
fn parent_directory_serves_includes_but_not_inputs() {
    let (root, dir) = workdir();
    let unsorted = "{\n\t\"schema_version\": \"3.0.0\",\n\t\"repositories\": [\n\t\t\"https://b.example/r.json\",\n\t\t\"https://a.example/r.json\"\n\t]\n}\n";
    std::fs::write(root.path().join("channel.json"), unsorted).unwrap();

    let with_include = "{\n\t\"schema_version\": \"3.0.0\",\n\t\"includes\": [\n\t\t\"./repository/a.json\"\n\t]\n}\n";
    std::fs::write(dir.join("repository.json"), with_include).unwrap();
    std::fs::create_dir(root.path().join("repository")).unwrap();
    std::fs::write(root.path().join("repository/a.json"), REPOSITORY).unwrap();

    chanlint(&dir)
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "skipped: channel check skipped: \"channel.json\" does not exist",
        ))
        .stdout(predicate::str::contains("load error").not())
        .stdout(predicate::str::contains("PASSED"));
}

#[test]
fn malformed_repository_is_a_load_failure() {
    let (_root, dir) = workdir();
    std::fs::write(dir.join("channel.json"), CHANNEL).unwrap();
    std::fs::write(dir.join("repository.json"), "{\n\t\"packages\": [\n").unwrap();

    chanlint(&dir)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("repository.json load error:"))
        .stdout(predicate::str::contains("repository.json /").not())
        .stdout(predicate::str::contains("LOAD FAILURE"));
}

#[test]
fn schema_errors_exit_one() {
    let (_root, dir) = workdir();
    let unsorted = "{\n\t\"schema_version\": \"3.0.0\",\n\t\"repositories\": [\n\t\t\"https://b.example/r.json\",\n\t\t\"https://a.example/r.json\"\n\t]\n}\n";
    std::fs::write(dir.join("channel.json"), unsorted).unwrap();

    chanlint(&dir)
        .args(["--repository", ""])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "channel.json /repositories/1 error: repositories must be sorted alphabetically",
        ));
}

#[test]
fn missing_include_is_a_load_failure() {
    let (_root, dir) = workdir();
    let with_include = "{\n\t\"schema_version\": \"3.0.0\",\n\t\"includes\": [\n\t\t\"./repository/a.json\"\n\t]\n}\n";
    std::fs::write(dir.join("repository.json"), with_include).unwrap();

    chanlint(&dir)
        .args(["--channel", ""])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("a.json: file not found"));
}

#[test]
fn config_errors_exit_two_before_reading_documents() {
    let (_root, dir) = workdir();
    std::fs::write(dir.join("repository.json"), "not json").unwrap();

    chanlint(&dir)
        .args(["--concurrency", "0"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("concurrency must be at least 1"));

    chanlint(&dir)
        .args(["--channel", "", "--test-repositories"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--test-repositories requires a channel file"));
}

#[test]
fn config_file_is_applied() {
    let (_root, dir) = workdir();
    std::fs::write(dir.join("chanlint.yaml"), "channel: \"\"\nrepository: \"\"\n").unwrap();

    chanlint(&dir)
        .args(["--config", "chanlint.yaml"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("skipped: channel check disabled"));

    std::fs::write(dir.join("bad.yaml"), "colour: red\n").unwrap();
    chanlint(&dir)
        .args(["--config", "bad.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bad.yaml"));
}

#[test]
fn json_report() {
    let (_root, dir) = workdir();
    std::fs::write(dir.join("channel.json"), CHANNEL).unwrap();
    std::fs::write(dir.join("repository.json"), REPOSITORY).unwrap();

    let output = chanlint(&dir).args(["--format", "json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["verdict"], "pass");
    assert_eq!(report["summary"]["documents"], 2);
}

#[test]
fn reports_are_byte_identical_across_runs() {
    let (_root, dir) = workdir();
    std::fs::write(dir.join("channel.json"), "{\n  \"repositories\": [\"b\", \"a\"],\n  \"x\": 1\n}").unwrap();
    std::fs::write(dir.join("repository.json"), REPOSITORY).unwrap();

    let first = chanlint(&dir).output().unwrap();
    let second = chanlint(&dir).output().unwrap();
    assert_eq!(first.status.code(), Some(1));
    assert_eq!(first.stdout, second.stdout);
}
