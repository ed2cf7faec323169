//! Offline optimizer: pick few-shot demonstrations from the training split, score them on
//! validation, and package the result as a [`SelectorArtifact`].

use crate::artifact::{data_hash, ArtifactMetadata, SelectorArtifact, ARTIFACT_VERSION, SELECTOR_INSTRUCTIONS};
use crate::evaluator::Evaluator;
use crate::predictor::{FewShotPredictor, HeuristicBaseline};
use std::collections::HashSet;
use wm_core::{LabeledExample, Result, SelectorConfig, SelectorError};
use wm_dataset::split_examples;

pub const OPTIMIZER_NAME: &str = "few-shot-selection";

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeOptions {
    pub split: f64,
    pub max_demos: usize,
    pub teacher_model: String,
    pub runtime_model: String,
}

impl OptimizeOptions {
    pub fn from_config(config: &SelectorConfig) -> Self {
        Self {
            split: config.dataset.train_split,
            max_demos: config.dataset.max_demos,
            teacher_model: config.models.teacher_model.clone(),
            runtime_model: config.models.runtime_model.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationReport {
    pub artifact: SelectorArtifact,
    pub baseline_score: f64,
    pub optimized_score: f64,
    pub train_count: usize,
    pub val_count: usize,
}

impl OptimizationReport {
    pub fn improvement(&self) -> f64 {
        self.optimized_score - self.baseline_score
    }
}

/// Up to `max_demos` training examples, covering distinct (model, task type) pairs first
/// and then filling in input order.
pub fn select_demos(train: &[LabeledExample], max_demos: usize) -> Vec<LabeledExample> {
    let mut seen = HashSet::new();
    let mut picked: Vec<usize> = Vec::new();

    for (idx, ex) in train.iter().enumerate() {
        if picked.len() >= max_demos {
            break;
        }
        if seen.insert((ex.label.recommended_model.as_str(), ex.inputs.task_type_hint)) {
            picked.push(idx);
        }
    }
    for idx in 0..train.len() {
        if picked.len() >= max_demos {
            break;
        }
        if !picked.contains(&idx) {
            picked.push(idx);
        }
    }

    picked.sort_unstable();
    picked.into_iter().map(|idx| train[idx].clone()).collect()
}

/// Build an artifact from labeled examples.
///
/// Fails with [`SelectorError::InsufficientData`] below `dataset.min_examples`.
pub fn optimize(
    examples: &[LabeledExample],
    config: &SelectorConfig,
    options: &OptimizeOptions,
    data_source: &str,
    data: &[u8],
) -> Result<OptimizationReport> {
    let required = config.dataset.min_examples;
    if examples.len() < required {
        return Err(SelectorError::InsufficientData { found: examples.len(), required });
    }

    let (train, val) = split_examples(examples, options.split);
    tracing::info!(train = train.len(), val = val.len(), "split dataset");

    let evaluator = Evaluator::new(config);
    let baseline = evaluator.evaluate(val, &HeuristicBaseline::new(config), "baseline");

    let demos = select_demos(train, options.max_demos);
    let candidate = FewShotPredictor::new(demos.clone());
    let optimized = evaluator.evaluate(val, &candidate, "optimized");
    tracing::info!(
        demos = demos.len(),
        baseline = baseline.routing_score,
        optimized = optimized.routing_score,
        "scored few-shot selection"
    );

    let artifact = SelectorArtifact {
        version: ARTIFACT_VERSION.into(),
        created_at: chrono::Utc::now(),
        optimizer: Some(OPTIMIZER_NAME.into()),
        teacher_model: options.teacher_model.clone(),
        runtime_model: options.runtime_model.clone(),
        system_prompt: SELECTOR_INSTRUCTIONS.into(),
        few_shot_examples: demos,
        model_candidates: config.models.candidates.clone(),
        metadata: ArtifactMetadata {
            training_records: train.len(),
            validation_records: val.len(),
            val_score: (optimized.routing_score * 10_000.0).round() / 10_000.0,
            data_source: data_source.to_string(),
            data_hash: data_hash(data),
        },
    };

    Ok(OptimizationReport {
        artifact,
        baseline_score: baseline.routing_score,
        optimized_score: optimized.routing_score,
        train_count: train.len(),
        val_count: val.len(),
    })
}
