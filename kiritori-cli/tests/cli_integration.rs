//! Integration tests for the kiritori CLI

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Helper to get the path to a test fixture
fn fixture_path(name: &str) -> String {
    format!("tests/fixtures/{}", name)
}

fn kiritori() -> Command {
    let mut cmd = Command::cargo_bin("kiritori").unwrap();
    cmd.env_remove("KIRITORI_CONFIG");
    cmd
}

fn json_records(output: &[u8]) -> Vec<Value> {
    let value: Value = serde_json::from_slice(output).unwrap();
    value.as_array().unwrap().clone()
}

#[test]
fn test_chunk_json_reconstructs_input() {
    let source = fs::read_to_string(fixture_path("english-sample.md")).unwrap();
    let output = kiritori()
        .args(["chunk", "-q", "-i"])
        .arg(fixture_path("english-sample.md"))
        .args(["--max-chunk-size", "160", "--overlap", "20"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let records = json_records(&output.stdout);
    assert!(records.len() > 1);
    let joined: String = records
        .iter()
        .map(|r| r["main_content"].as_str().unwrap())
        .collect();
    assert_eq!(joined, source);
    assert_eq!(records[0]["context"], Value::Null);
    assert_eq!(records[1]["metadata"]["has_context"], true);
    assert!(records
        .iter()
        .any(|r| r["layout_metadata"]["has_formulas"] == true));
}

#[test]
fn test_japanese_text_output() {
    kiritori()
        .args(["chunk", "-q", "-f", "text", "--max-chunk-size", "60", "--overlap", "0", "-i"])
        .arg(fixture_path("japanese-sample.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("--- chunk 0 [0.."))
        .stdout(predicate::str::contains("これはテストです。"));
}

#[test]
fn test_jsonl_output() {
    let output = kiritori()
        .args(["chunk", "-q", "-f", "jsonl", "--max-chunk-size", "200", "-i"])
        .arg(fixture_path("english-sample.md"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    for (i, line) in stdout.lines().enumerate() {
        let record: Value = serde_json::from_str(line).unwrap();
        assert_eq!(record["chunk_id"], i);
    }
}

#[test]
fn test_latex_formula_format() {
    kiritori()
        .args(["chunk", "-q", "--formula-format", "latex", "--max-chunk-size", "200", "-i"])
        .arg(fixture_path("english-sample.md"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r"\\ce{H2O}"));
}

#[test]
fn test_output_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_file = temp_dir.path().join("chunks.json");

    kiritori()
        .args(["chunk", "-q", "-i"])
        .arg(fixture_path("english-sample.md"))
        .arg("-o")
        .arg(&output_file)
        .assert()
        .success();

    let content = fs::read(&output_file).unwrap();
    let records = json_records(&content);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["layout_metadata"]["element_counts"]["table"], 1);
    assert_eq!(records[0]["layout_metadata"]["element_counts"]["heading"], 2);
}

#[test]
fn test_glob_pattern_labels_sources() {
    let output = kiritori()
        .args(["chunk", "-q", "-i"])
        .arg(fixture_path("*"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let records = json_records(&output.stdout);
    let sources: Vec<&str> = records
        .iter()
        .map(|r| r["source"].as_str().unwrap())
        .collect();
    assert!(sources[0].ends_with("english-sample.md"));
    assert!(sources.last().unwrap().ends_with("japanese-sample.txt"));
}

#[test]
fn test_config_file_is_applied() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("kiritori.toml");
    fs::write(
        &config,
        "[chunking]\nmax_chunk_size = 120\noverlap_size = 0\n\n[output]\ndefault_format = \"jsonl\"\n",
    )
    .unwrap();

    let output = kiritori()
        .args(["chunk", "-q", "-i"])
        .arg(fixture_path("english-sample.md"))
        .arg("-c")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.lines().count() > 1);
    assert!(stdout.lines().all(|line| line.starts_with("{\"chunk_id\"")));
}

#[test]
fn test_invalid_file() {
    kiritori()
        .args(["chunk", "-i", "nonexistent.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No files found"));
}

#[test]
fn test_invalid_sizes() {
    kiritori()
        .args(["chunk", "--max-chunk-size", "100", "--overlap", "100", "-i"])
        .arg(fixture_path("english-sample.md"))
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "overlap_size (100) must be less than max_chunk_size (100)",
        ));
}

#[test]
fn test_generate_then_validate_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("kiritori.toml");

    kiritori()
        .arg("generate-config")
        .arg("-o")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("generated successfully"));

    kiritori()
        .arg("validate")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Max chunk size: 4000 bytes"));
}

#[test]
fn test_validate_rejects_bad_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("bad.toml");
    fs::write(&config, "[chunking]\nmax_chunk_size = 0\n").unwrap();

    kiritori()
        .arg("validate")
        .arg("-c")
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Configuration is invalid"));
}

#[test]
fn test_help_command() {
    kiritori()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chunk"))
        .stdout(predicate::str::contains("generate-config"));
}
