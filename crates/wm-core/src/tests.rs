use crate::*;
use std::collections::BTreeSet;

// ========== Enums ==========

#[test]
fn test_risk_flag_roundtrip_names() {
    for flag in RiskFlag::ALL {
        assert_eq!(flag.as_str().parse::<RiskFlag>().unwrap(), flag);
    }
    assert_eq!(RiskFlag::SchemaMigration.to_string(), "schema-migration");
}

#[test]
fn test_risk_flag_serde_kebab() {
    let json = serde_json::to_string(&RiskFlag::ModifiesExistingRuntime).unwrap();
    assert_eq!(json, "\"modifies-existing-runtime\"");
}

#[test]
fn test_unknown_variant() {
    let err = "gigantic".parse::<CostBand>().unwrap_err();
    assert_eq!(err.kind, "cost band");
    assert!(err.to_string().contains("gigantic"));
}

#[test]
fn test_parse_case_insensitive() {
    assert_eq!(" Medium ".parse::<Confidence>().unwrap(), Confidence::Medium);
    assert_eq!("CODEX".parse::<Agent>().unwrap(), Agent::Codex);
}

#[test]
fn test_cost_band_ordering() {
    assert!(CostBand::Low < CostBand::Medium);
    assert!(CostBand::Medium < CostBand::High);
}

#[test]
fn test_task_type_names() {
    assert_eq!(TaskType::Unknown.to_string(), "unknown");
    assert_eq!("infrastructure".parse::<TaskType>().unwrap(), TaskType::Infrastructure);
}

// ========== HistoricalRecord ==========

#[test]
fn test_record_full() {
    let line = r#"{"originalPrompt":"fix it","sourceRepo":"wavemill","modelId":"gpt-5.3-codex","score":0.6,"interventionCount":2,"workflowCost":12.5}"#;
    let r: HistoricalRecord = serde_json::from_str(line).unwrap();
    assert_eq!(r.original_prompt, "fix it");
    assert_eq!(r.repo(), "wavemill");
    assert_eq!(r.model_or("x"), "gpt-5.3-codex");
    assert_eq!(r.interventions(), 2);
    assert_eq!(r.workflow_cost, Some(12.5));
}

#[test]
fn test_record_defaults() {
    let r: HistoricalRecord = serde_json::from_str(r#"{"originalPrompt":"hello"}"#).unwrap();
    assert_eq!(r.repo(), "unknown");
    assert_eq!(r.model_or("fallback"), "fallback");
    assert_eq!(r.score(), 0.0);
    assert_eq!(r.interventions(), 0);
    assert!(r.workflow_cost.is_none());
}

#[test]
fn test_record_nulls_are_absent() {
    let r: HistoricalRecord =
        serde_json::from_str(r#"{"originalPrompt":"x","interventionCount":null,"workflowCost":null}"#).unwrap();
    assert_eq!(r.interventions(), 0);
    assert!(r.workflow_cost.is_none());

    let r: HistoricalRecord = serde_json::from_str(
        r#"{"originalPrompt":"x","sourceRepo":null,"modelId":null,"score":null}"#,
    )
    .unwrap();
    assert_eq!(r.repo(), "unknown");
    assert_eq!(r.model_or("fallback"), "fallback");
    assert_eq!(r.score(), 0.0);

    let r: HistoricalRecord = serde_json::from_str(r#"{"originalPrompt":null}"#).unwrap();
    assert_eq!(r.original_prompt, "");
}

#[test]
fn test_record_whole_float_interventions() {
    let r: HistoricalRecord = serde_json::from_str(r#"{"originalPrompt":"x","interventionCount":1.0}"#).unwrap();
    assert_eq!(r.interventions(), 1);
    assert!(serde_json::from_str::<HistoricalRecord>(r#"{"originalPrompt":"x","interventionCount":1.5}"#).is_err());
}

#[test]
fn test_record_ignores_extra_fields() {
    let r: HistoricalRecord =
        serde_json::from_str(r#"{"originalPrompt":"x","taskId":"T-1","timestamp":"2026-01-01"}"#).unwrap();
    assert_eq!(r.original_prompt, "x");
}

#[test]
fn test_record_negative_interventions_rejected() {
    assert!(serde_json::from_str::<HistoricalRecord>(r#"{"originalPrompt":"x","interventionCount":-1}"#).is_err());
    assert!(serde_json::from_str::<HistoricalRecord>(r#"{"originalPrompt":"x","interventionCount":-1.0}"#).is_err());
}

// ========== Labels & examples ==========

fn label() -> RoutingLabel {
    RoutingLabel {
        recommended_model: "gpt-5.3-codex".into(),
        recommended_agent: Agent::Codex,
        confidence: Confidence::High,
        risk_flags: BTreeSet::from([RiskFlag::SchemaMigration]),
        cost_estimate: CostBand::Low,
        reasoning: "Greenfield task suitable for Codex at lower cost.".into(),
    }
}

#[test]
fn test_labeled_example_is_flat() {
    let ex = LabeledExample {
        inputs: ExampleInputs {
            task_prompt: "add a new page".into(),
            repo_name: "site".into(),
            task_type_hint: TaskType::Feature,
            available_models: "a,b".into(),
        },
        label: label(),
    };
    let v = serde_json::to_value(&ex).unwrap();
    assert_eq!(v["task_prompt"], "add a new page");
    assert_eq!(v["recommended_agent"], "codex");
    assert_eq!(v["risk_flags"][0], "schema-migration");
    let back: LabeledExample = serde_json::from_value(v).unwrap();
    assert_eq!(back, ex);
}

#[test]
fn test_example_inputs_models() {
    let inputs = ExampleInputs {
        task_prompt: String::new(),
        repo_name: String::new(),
        task_type_hint: TaskType::Unknown,
        available_models: " a , b,,c".into(),
    };
    assert_eq!(inputs.models().collect::<Vec<_>>(), vec!["a", "b", "c"]);
}

#[test]
fn test_prediction_from_label() {
    let p = Prediction::from(&label());
    assert_eq!(p.recommended_model.as_deref(), Some("gpt-5.3-codex"));
    assert_eq!(p.cost_estimate.as_deref(), Some("low"));
    assert_eq!(p.risk_flags, vec!["schema-migration".to_string()]);
}

#[test]
fn test_partial_prediction_deserializes() {
    let p: Prediction = serde_json::from_str(r#"{"recommended_model":"m"}"#).unwrap();
    assert_eq!(p.recommended_model.as_deref(), Some("m"));
    assert!(p.risk_flags.is_empty());
    assert!(p.cost_estimate.is_none());
}

// ========== Config ==========

#[test]
fn test_default_config_valid() {
    let c = SelectorConfig::default();
    c.validate().unwrap();
    assert_eq!(c.models.available_models(), "claude-sonnet-4-5-20250929,gpt-5.3-codex");
    assert_eq!(c.dataset.max_prompt_length, 2000);
    assert_eq!(SELECTOR_CONFIG.thresholds.success_score, 0.85);
}

#[test]
fn test_partial_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("selector.json");
    std::fs::write(&path, r#"{"dataset":{"max_prompt_length":500}}"#).unwrap();
    let c = SelectorConfig::from_file(&path).unwrap();
    assert_eq!(c.dataset.max_prompt_length, 500);
    assert_eq!(c.dataset.min_examples, 10);
    assert_eq!(c.models.alternate_model, "gpt-5.3-codex");
}

#[test]
fn test_invalid_config_rejected() {
    let mut c = SelectorConfig::default();
    c.dataset.train_split = 1.5;
    assert!(matches!(c.validate(), Err(SelectorError::InvalidConfig(_))));

    let mut c = SelectorConfig::default();
    c.cost_bands.low_below = 30.0;
    assert!(c.validate().is_err());
}

#[test]
fn test_not_found_errors() {
    let e = SelectorError::ArtifactNotFound { path: "a.json".into() };
    assert!(e.is_not_found());
    assert!(e.to_string().contains("a.json"));
    let e = SelectorError::InsufficientData { found: 3, required: 10 };
    assert!(!e.is_not_found());
    assert!(e.to_string().contains("at least 10"));
}
