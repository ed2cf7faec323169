//! CLI integration tests for wm-selector.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn selector_cmd() -> Command {
    let mut cmd = Command::cargo_bin("wm-selector").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_evals(dir: &Path, n: usize) -> PathBuf {
    let mut lines = Vec::new();
    for i in 0..n {
        let (prompt, model, score, cost) = match i % 3 {
            0 => (format!("add a new settings page {i}"), "gpt-5.3-codex", 0.95, 4.0),
            1 => (format!("fix the prisma migration {i}"), "claude-sonnet-4-5-20250929", 0.9, 18.0),
            _ => (format!("tune the logging output {i}"), "gpt-5.3-codex", 0.3, 30.0),
        };
        lines.push(
            serde_json::json!({
                "originalPrompt": prompt,
                "modelId": model,
                "score": score,
                "interventionCount": 0,
                "workflowCost": cost,
            })
            .to_string(),
        );
    }
    lines.push("{ broken".into());
    let path = dir.join("evals.jsonl");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

#[test]
fn test_prepare_prints_distribution() {
    let dir = TempDir::new().unwrap();
    let evals = write_evals(dir.path(), 12);

    selector_cmd()
        .args(["prepare", "--evals"])
        .arg(&evals)
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 12 training examples"))
        .stdout(predicate::str::contains("Model distribution:"))
        .stdout(predicate::str::contains("gpt-5.3-codex"));
}

#[test]
fn test_prepare_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    selector_cmd()
        .args(["prepare", "--evals"])
        .arg(dir.path().join("nope.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Evals file not found"));
}

#[test]
fn test_optimize_then_evaluate() {
    let dir = TempDir::new().unwrap();
    let evals = write_evals(dir.path(), 30);
    let artifact = dir.path().join("artifacts").join("selector.json");

    selector_cmd()
        .args(["optimize", "--evals"])
        .arg(&evals)
        .arg("--output")
        .arg(&artifact)
        .args(["--max-demos", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved optimized selector"));

    let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
    assert_eq!(doc["few_shot_examples"].as_array().unwrap().len(), 3);
    assert_eq!(doc["metadata"]["training_records"], 24);

    selector_cmd()
        .args(["evaluate", "--evals"])
        .arg(&evals)
        .arg("--artifact")
        .arg(&artifact)
        .args(["--threads", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation set: 6 examples"))
        .stdout(predicate::str::contains("Optimized"))
        .stdout(predicate::str::contains("Routing Score"));
}

#[test]
fn test_optimize_insufficient_data() {
    let dir = TempDir::new().unwrap();
    let evals = write_evals(dir.path(), 4);

    selector_cmd()
        .args(["optimize", "--evals"])
        .arg(&evals)
        .arg("--output")
        .arg(dir.path().join("out.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Need at least 10 examples"));
}

#[test]
fn test_evaluate_without_artifact_reports_baseline() {
    let dir = TempDir::new().unwrap();
    let evals = write_evals(dir.path(), 15);

    selector_cmd()
        .args(["evaluate", "--evals"])
        .arg(&evals)
        .arg("--artifact")
        .arg(dir.path().join("missing.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No artifact found"))
        .stdout(predicate::str::contains("Heuristic"))
        .stdout(predicate::str::contains("Delta").not());
}

#[test]
fn test_evaluate_json_output() {
    let dir = TempDir::new().unwrap();
    let evals = write_evals(dir.path(), 15);

    let output = selector_cmd()
        .args(["evaluate", "--format", "json", "--evals"])
        .arg(&evals)
        .arg("--artifact")
        .arg(dir.path().join("missing.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["validation"]["total"], 3);
    assert_eq!(doc["baseline"]["n"], 3);
    assert!(doc["optimized"].is_null());
}

#[test]
fn test_config_override() {
    let dir = TempDir::new().unwrap();
    let evals = write_evals(dir.path(), 12);
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"dataset":{"min_examples":50}}"#).unwrap();

    selector_cmd()
        .arg("--config")
        .arg(&config)
        .args(["optimize", "--evals"])
        .arg(&evals)
        .arg("--output")
        .arg(dir.path().join("out.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Need at least 50 examples"));
}

#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    let evals = write_evals(dir.path(), 12);
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"dataset":{"train_split":1.5}}"#).unwrap();

    selector_cmd()
        .arg("--config")
        .arg(&config)
        .args(["prepare", "--evals"])
        .arg(&evals)
        .assert()
        .failure();
}

#[test]
fn test_evaluate_with_unreadable_artifact_reports_baseline() {
    let dir = TempDir::new().unwrap();
    let evals = write_evals(dir.path(), 15);
    let artifact = dir.path().join("broken.json");
    std::fs::write(&artifact, "{ not an artifact").unwrap();

    selector_cmd()
        .args(["evaluate", "--evals"])
        .arg(&evals)
        .arg("--artifact")
        .arg(&artifact)
        .assert()
        .success()
        .stdout(predicate::str::contains("Could not load artifact"))
        .stdout(predicate::str::contains("Model Accuracy"))
        .stdout(predicate::str::contains("Delta").not());
}

#[test]
fn test_evaluate_accepts_free_form_demos() {
    let dir = TempDir::new().unwrap();
    let evals = write_evals(dir.path(), 15);
    let artifact = dir.path().join("selector.json");
    let doc = serde_json::json!({
        "teacher_model": "claude-sonnet-4-5-20250929",
        "few_shot_examples": [{
            "task_prompt": "add a new settings page",
            "task_type_hint": "",
            "recommended_model": "gpt-5.3-codex",
            "risk_flags": ["auth-changes"],
            "cost_estimate": "low"
        }],
        "metadata": {"val_score": 0.7}
    });
    std::fs::write(&artifact, doc.to_string()).unwrap();

    selector_cmd()
        .args(["evaluate", "--evals"])
        .arg(&evals)
        .arg("--artifact")
        .arg(&artifact)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 demonstrations"))
        .stdout(predicate::str::contains("Delta"));
}
