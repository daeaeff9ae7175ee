//! End-to-end tests for the `lathe` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const TRAINING_CSV: &str = "feature1,feature2,label\n1,2,0\n3,4,1\n5,6,1\n";
const TEST_CSV: &str = "feature1,feature2,label\n1,2,0\n5,6,1\n";

/// `lathe` isolated from the caller's config files and environment.
fn lathe(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lathe").unwrap();
    cmd.current_dir(temp.path())
        .env("HOME", temp.path())
        .env_remove("RUST_LOG")
        .env_remove("LATHE_LABEL_COLUMN")
        .env_remove("LATHE_POLL_INTERVAL_MS")
        .env_remove("LATHE_GENERATE_COMPLETIONS")
        .env("LATHE_DATA_DIR", temp.path().join("data"))
        .env("NO_COLOR", "1");
    cmd
}

fn write_csv(temp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn train(temp: &TempDir) {
    let file = write_csv(temp, "train.csv", TRAINING_CSV);
    lathe(temp).arg("train").arg(&file).assert().success();
}

fn flag(temp: &TempDir) -> String {
    std::fs::read_to_string(temp.path().join("data").join("process_indicator.txt")).unwrap()
}

#[test]
fn test_status_fresh_data_dir() {
    let temp = TempDir::new().unwrap();
    lathe(&temp).arg("status").assert().success().stdout(predicate::str::contains("No training data"));
    assert_eq!(flag(&temp), "no file");
}

#[test]
fn test_train_then_status() {
    let temp = TempDir::new().unwrap();
    let file = write_csv(&temp, "train.csv", TRAINING_CSV);

    lathe(&temp)
        .arg("train")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Training done!"))
        .stdout(predicate::str::contains("feature1, feature2"));

    lathe(&temp).arg("status").assert().success().stdout(predicate::str::contains("Training done!"));
    assert_eq!(flag(&temp), "trained");
}

#[test]
fn test_status_json_output() {
    let temp = TempDir::new().unwrap();
    train(&temp);

    let assert = lathe(&temp).arg("status").arg("--json").assert().success();
    let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(json["status"], "trained");
    assert_eq!(json["token"], "trained");
}

#[test]
fn test_train_json_outputs_manifest() {
    let temp = TempDir::new().unwrap();
    let file = write_csv(&temp, "train.csv", TRAINING_CSV);

    let assert = lathe(&temp).arg("train").arg(&file).arg("--json").assert().success();
    let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(json["feature_names"], serde_json::json!(["feature1", "feature2"]));
    assert_eq!(json["classes"], serde_json::json!(["0", "1"]));
    assert_eq!(json["label_column"], "label");
}

#[test]
fn test_train_with_data_uri() {
    let temp = TempDir::new().unwrap();
    let blob = lathe_training::encode_upload("text/csv", TRAINING_CSV.as_bytes());

    lathe(&temp).arg("train").arg("--data-uri").arg(&blob).assert().success();
    assert_eq!(flag(&temp), "trained");
}

#[test]
fn test_malformed_upload_leaves_status() {
    let temp = TempDir::new().unwrap();
    train(&temp);

    lathe(&temp)
        .arg("train")
        .arg("--data-uri")
        .arg("no delimiter here")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decode error"));
    assert_eq!(flag(&temp), "trained");
}

#[test]
fn test_train_requires_input() {
    let temp = TempDir::new().unwrap();
    lathe(&temp).arg("train").assert().failure();
}

#[test]
fn test_train_missing_file() {
    let temp = TempDir::new().unwrap();
    lathe(&temp)
        .arg("train")
        .arg("does-not-exist.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_evaluate_before_training() {
    let temp = TempDir::new().unwrap();
    let file = write_csv(&temp, "test.csv", TEST_CSV);

    lathe(&temp)
        .arg("evaluate")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No trained model found"));
}

#[test]
fn test_evaluate_prints_curve() {
    let temp = TempDir::new().unwrap();
    train(&temp);
    let file = write_csv(&temp, "test.csv", TEST_CSV);

    lathe(&temp)
        .arg("evaluate")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("ROC curve"))
        .stdout(predicate::str::contains("AUC: 1.0000"));
}

#[test]
fn test_evaluate_json_and_output_file() {
    let temp = TempDir::new().unwrap();
    train(&temp);
    let file = write_csv(&temp, "test.csv", TEST_CSV);
    let out = temp.path().join("roc.json");

    let assert = lathe(&temp).arg("evaluate").arg(&file).arg("--json").arg("--output").arg(&out).assert().success();
    let printed: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();

    assert_eq!(printed, written);
    assert_eq!(printed["layout"]["title"], "ROC curve");
    assert_eq!(printed["layout"]["xaxis"]["title"], "FPR");
    assert_eq!(printed["data"][0]["x"][0], 0.0);
}

#[test]
fn test_evaluate_schema_mismatch() {
    let temp = TempDir::new().unwrap();
    train(&temp);
    let file = write_csv(&temp, "test.csv", "feature1,label\n1,0\n5,1\n");

    lathe(&temp)
        .arg("evaluate")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Evaluation error"));
}

#[test]
fn test_reset_keeps_model() {
    let temp = TempDir::new().unwrap();
    train(&temp);
    let file = write_csv(&temp, "test.csv", TEST_CSV);

    lathe(&temp).arg("reset").assert().success().stdout(predicate::str::contains("Training status reset"));
    lathe(&temp).arg("status").assert().success().stdout(predicate::str::contains("No training data"));
    lathe(&temp).arg("evaluate").arg(&file).assert().success();
}

#[test]
fn test_reset_repairs_corrupt_flag() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("process_indicator.txt"), "garbage").unwrap();

    lathe(&temp).arg("status").assert().failure().stderr(predicate::str::contains("Training status unknown"));
    lathe(&temp).arg("reset").assert().success();
    assert_eq!(flag(&temp), "no file");
}

#[test]
fn test_reset_purge_model() {
    let temp = TempDir::new().unwrap();
    train(&temp);
    let file = write_csv(&temp, "test.csv", TEST_CSV);

    lathe(&temp).arg("reset").arg("--purge-model").assert().success();
    assert!(!model_path(temp.path()).exists());
    lathe(&temp).arg("evaluate").arg(&file).assert().failure();
}

fn model_path(root: &Path) -> PathBuf {
    root.join("data").join("models").join("trained_model.json")
}

#[test]
fn test_watch_until_trained_exits() {
    let temp = TempDir::new().unwrap();
    train(&temp);

    lathe(&temp)
        .arg("watch")
        .arg("--until-trained")
        .arg("--interval-ms")
        .arg("10")
        .timeout(Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("Training done!"));
}

#[test]
fn test_data_dir_flag_overrides_env() {
    let temp = TempDir::new().unwrap();
    let other = temp.path().join("elsewhere");

    lathe(&temp).arg("--data-dir").arg(&other).arg("status").assert().success();
    assert!(other.join("process_indicator.txt").exists());
    assert!(!temp.path().join("data").exists());
}

#[test]
fn test_local_config_file_is_read() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(".latherc"), "label_column = \"defect\"\n").unwrap();
    let file = write_csv(&temp, "train.csv", "temp,defect\n10,no\n90,yes\n");

    let assert = lathe(&temp).arg("train").arg(&file).arg("--json").assert().success();
    let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(json["label_column"], "defect");
}

#[test]
fn test_generate_completions() {
    let temp = TempDir::new().unwrap();
    lathe(&temp)
        .env("LATHE_GENERATE_COMPLETIONS", "bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("lathe"));
}
