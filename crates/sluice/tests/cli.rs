//! Smoke tests for the sluice binary
//!
//! These run the compiled binary against a temporary config and input
//! file and check what it prints.

use std::io::Write;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::NamedTempFile;

const CONFIG: &str = r#"
[log]
level = "warn"

[metrics]
format = "json"

[[pipelines]]
id = "things"
event_type = { pattern = "^thing-" }
stages = [{ type = "tag", tags = { seen = "yes" } }]
sink = { type = "memory", batch_size = 10, reject_first = [1, 1] }

[retry]
max_retries = 1
retry_base_delay_ms = 1
"#;

const INPUT: &str = r#"{"id": "a", "event_type": "thing-created"}
{"id": "b", "event_type": "thing-deleted"}
{"id": "c", "event_type": "other"}
"#;

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn sluice(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sluice"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_run_prints_metrics_document() {
    let config = temp_file(CONFIG);
    let input = temp_file(INPUT);

    let output = sluice(&[
        "run",
        "--config",
        config.path().to_str().unwrap(),
        "--input",
        input.path().to_str().unwrap(),
        "--publish-time",
        "0",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let document: Value = serde_json::from_str(stdout.lines().last().unwrap()).unwrap();
    assert_eq!(document["type"], "invocation");
    assert_eq!(document["metrics"]["uow.count"], 3.0);
    assert_eq!(document["metrics"]["things|pipeline.time"]["count"], 2);
}

#[test]
fn test_strict_fails_on_rejected_records() {
    let config = temp_file(CONFIG);
    let input = temp_file(INPUT);
    let args = [
        "run",
        "--config",
        config.path().to_str().unwrap(),
        "--input",
        input.path().to_str().unwrap(),
        "--strict",
    ];

    let output = sluice(&args);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("2 record(s) failed"));
}

#[test]
fn test_check_lists_pipelines() {
    let config = temp_file(CONFIG);

    let output = sluice(&["check", "--config", config.path().to_str().unwrap(), "--types"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("1 pipeline(s)"));
    assert!(stdout.contains("things [parallelism"));
    assert!(stdout.contains("tag -> memory (batches of 10)"));
    assert!(stdout.contains("sink types: stdout, memory"));
}

#[test]
fn test_missing_config_fails() {
    let output = sluice(&["check", "--config", "/nonexistent/sluice.toml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("config file not found"));
}
