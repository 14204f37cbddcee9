use assert_cmd::Command;
use predicates::prelude::*;

fn get_transcript() -> Command {
    let mut cmd = Command::cargo_bin("get-transcript").unwrap();
    cmd.env_remove("TRANSCRIPT_LANGUAGES")
        .env_remove("TRANSCRIPT_FAIL_ON_ERROR")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 1, "expected one line, got {:?}", stdout);
    serde_json::from_str(&stdout).unwrap()
}

#[test]
fn test_missing_argument_reports_invalid_arguments() {
    let output = get_transcript().assert().success().get_output().clone();

    let value = stdout_json(&output);
    assert_eq!(value["success"], false);
    assert_eq!(value["error_type"], "INVALID_ARGUMENTS");
    assert_eq!(value["error"], "Video ID argument required");
    assert!(value.get("video_id").is_none());
}

#[test]
fn test_blank_argument_reports_invalid_arguments() {
    let output = get_transcript().arg("   ").assert().success().get_output().clone();

    let value = stdout_json(&output);
    assert_eq!(value["error_type"], "INVALID_ARGUMENTS");
}

#[test]
fn test_fail_on_error_sets_exit_code() {
    get_transcript()
        .arg("--fail-on-error")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"success\":false"));
}

#[test]
fn test_help_mentions_languages() {
    get_transcript()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--languages"));
}

#[test]
fn test_probe_help() {
    Command::cargo_bin("transcript-probe")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--samples"));
}
