//! End-to-end: eval JSONL -> labeled dataset -> optimized artifact -> evaluation.

use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;
use wm_core::{SelectorConfig, SelectorError};
use wm_dataset::{split_examples, DatasetBuilder, LabelDistribution};
use wm_eval::{
    load_artifact, optimize, save_artifact, Blocking, Comparison, Evaluator, FewShotPredictor, HeuristicBaseline,
    OptimizeOptions,
};

fn eval_line(prompt: &str, model: &str, score: f64, cost: f64) -> String {
    serde_json::json!({
        "originalPrompt": prompt,
        "sourceRepo": "wavemill",
        "modelId": model,
        "score": score,
        "interventionCount": 0,
        "workflowCost": cost,
    })
    .to_string()
}

fn write_evals(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("evals.jsonl");
    let mut file = std::fs::File::create(&path).unwrap();
    for i in 0..30 {
        let line = match i % 3 {
            0 => eval_line(&format!("add a new settings page {i}"), "gpt-5.3-codex", 0.95, 4.0),
            1 => eval_line(&format!("fix the prisma migration for table {i}"), "claude-sonnet-4-5-20250929", 0.9, 18.0),
            _ => eval_line(&format!("tune the logging output {i}"), "claude-haiku-4-5-20251001", 0.4, 30.0),
        };
        writeln!(file, "{line}").unwrap();
    }
    writeln!(file, "not json at all").unwrap();
    writeln!(file, r#"{{"modelId":"gpt-5.3-codex","score":1.0}}"#).unwrap();
    path
}

#[test]
fn test_full_pipeline() {
    let dir = TempDir::new().unwrap();
    let evals = write_evals(&dir);
    let config = SelectorConfig::default();

    let builder = DatasetBuilder::new(config.clone());
    let outcome = builder.build(std::fs::read_to_string(&evals).unwrap().lines());
    assert_eq!(outcome.examples.len(), 30);
    assert_eq!(outcome.skipped(), 2);

    let dist = LabelDistribution::from_examples(&outcome.examples);
    assert_eq!(dist.total, 30);
    assert!(dist.model_share("gpt-5.3-codex") > 0.0);

    let data = std::fs::read(&evals).unwrap();
    let report = optimize(
        &outcome.examples,
        &config,
        &OptimizeOptions::from_config(&config),
        &evals.display().to_string(),
        &data,
    )
    .unwrap();
    assert_eq!(report.train_count, 24);
    assert_eq!(report.val_count, 6);
    assert!(report.optimized_score >= report.baseline_score);

    let artifact_path = dir.path().join("out").join("optimized-selector.json");
    save_artifact(&artifact_path, &report.artifact).unwrap();
    let artifact = load_artifact(&artifact_path).unwrap();
    assert_eq!(artifact.metadata.validation_records, 6);
    assert!(artifact.metadata.data_hash.starts_with("sha256:"));

    let (_, val) = split_examples(&outcome.examples, config.dataset.train_split);
    let evaluator = Evaluator::new(&config);
    let baseline = evaluator.evaluate(val, &HeuristicBaseline::new(&config), "Heuristic");
    let optimized = evaluator.evaluate(val, &FewShotPredictor::from_artifact(&artifact), "Optimized");
    assert!((optimized.routing_score - artifact.metadata.val_score).abs() < 1e-4);

    let table = Comparison::new(baseline, Some(optimized)).to_string();
    assert!(table.contains("Model Accuracy"));
}

#[tokio::test]
async fn test_concurrent_evaluation_of_loaded_artifact() {
    let dir = TempDir::new().unwrap();
    let evals = write_evals(&dir);
    let config = SelectorConfig::default();
    let examples = DatasetBuilder::new(config.clone()).load_file(&evals).unwrap();

    let report = optimize(&examples, &config, &OptimizeOptions::from_config(&config), "evals.jsonl", b"").unwrap();
    let predictor = FewShotPredictor::from_artifact(&report.artifact);

    let (_, val) = split_examples(&examples, config.dataset.train_split);
    let evaluator = Evaluator::new(&config);
    let sequential = evaluator.evaluate(val, &predictor, "Optimized");
    let concurrent = evaluator
        .evaluate_concurrent(val, Arc::new(Blocking::new(predictor)), "Optimized", 3)
        .await;
    assert_eq!(sequential, concurrent);
}

#[test]
fn test_missing_inputs() {
    let config = SelectorConfig::default();
    let err = DatasetBuilder::new(config).load_file("/no/such/evals.jsonl").unwrap_err();
    assert!(matches!(err, SelectorError::DataNotFound { .. }));
    assert!(load_artifact("/no/such/artifact.json").unwrap_err().is_not_found());
}
