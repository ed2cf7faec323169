//! Routing policies behind a common capability interface.

use crate::artifact::SelectorArtifact;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use wm_core::{Agent, Confidence, CostBand, ExampleInputs, LabeledExample, Prediction, SelectorConfig, SELECTOR_CONFIG};
use wm_router::resolve_agent;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Prediction failed: {0}")]
    Failed(String),
    #[error("Malformed prediction: {0}")]
    Malformed(String),
    #[error("No demonstrations available")]
    NoDemonstrations,
}

/// A synchronous routing policy.
pub trait Predictor: Send + Sync {
    fn predict(&self, inputs: &ExampleInputs) -> Result<Prediction, PredictionError>;
}

impl<F> Predictor for F
where
    F: Fn(&ExampleInputs) -> Result<Prediction, PredictionError> + Send + Sync,
{
    fn predict(&self, inputs: &ExampleInputs) -> Result<Prediction, PredictionError> {
        self(inputs)
    }
}

/// Pin a closure's signature so it can be used as a [`Predictor`].
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(&ExampleInputs) -> Result<Prediction, PredictionError> + Send + Sync,
{
    f
}

/// A routing policy that waits on I/O (model API, subprocess).
#[async_trait]
pub trait AsyncPredictor: Send + Sync {
    async fn predict(&self, inputs: &ExampleInputs) -> Result<Prediction, PredictionError>;
}

/// Run a synchronous predictor where an async one is expected.
///
/// Each call goes to tokio's blocking pool, so a slow predictor never stalls the runtime
/// and several calls can be in flight at once.
pub struct Blocking<P>(Arc<P>);

impl<P> Blocking<P> {
    pub fn new(predictor: P) -> Self {
        Self(Arc::new(predictor))
    }

    pub fn inner(&self) -> &P {
        &self.0
    }
}

#[async_trait]
impl<P: Predictor + 'static> AsyncPredictor for Blocking<P> {
    async fn predict(&self, inputs: &ExampleInputs) -> Result<Prediction, PredictionError> {
        let predictor = Arc::clone(&self.0);
        let inputs = inputs.clone();
        tokio::task::spawn_blocking(move || predictor.predict(&inputs))
            .await
            .map_err(|e| PredictionError::Failed(format!("blocking prediction aborted: {e}")))?
    }
}

/// Always routes to the safe default model. Also the substitute for failed predictions.
#[derive(Debug, Clone)]
pub struct HeuristicBaseline {
    model: String,
    agent: Agent,
}

impl HeuristicBaseline {
    pub fn new(config: &SelectorConfig) -> Self {
        let model = config.models.default_model.clone();
        let agent = resolve_agent(&model, &config.models.agents);
        Self { model, agent }
    }

    pub fn prediction(&self) -> Prediction {
        Prediction {
            recommended_model: Some(self.model.clone()),
            recommended_agent: Some(self.agent.to_string()),
            confidence: Some(Confidence::Medium.to_string()),
            risk_flags: Vec::new(),
            cost_estimate: Some(CostBand::Medium.to_string()),
            reasoning: Some(format!("Heuristic default: always use {}.", self.model)),
        }
    }
}

impl Default for HeuristicBaseline {
    fn default() -> Self {
        Self::new(&SELECTOR_CONFIG)
    }
}

impl Predictor for HeuristicBaseline {
    fn predict(&self, _inputs: &ExampleInputs) -> Result<Prediction, PredictionError> {
        Ok(self.prediction())
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(|t| t.to_lowercase())
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Offline stand-in for an optimized policy: answers with the label of the closest
/// few-shot demonstration (same task type first, then prompt token overlap).
#[derive(Debug, Clone)]
pub struct FewShotPredictor {
    demos: Vec<LabeledExample>,
    demo_tokens: Vec<HashSet<String>>,
}

impl FewShotPredictor {
    pub fn new(demos: Vec<LabeledExample>) -> Self {
        let demo_tokens = demos.iter().map(|d| tokenize(&d.inputs.task_prompt)).collect();
        Self { demos, demo_tokens }
    }

    pub fn from_artifact(artifact: &SelectorArtifact) -> Self {
        Self::new(artifact.few_shot_examples.clone())
    }

    pub fn demos(&self) -> &[LabeledExample] {
        &self.demos
    }

    /// Closest demonstration whose model is among `inputs.available_models` (any model when
    /// that list is empty); ties go to the earlier one.
    pub fn nearest(&self, inputs: &ExampleInputs) -> Option<&LabeledExample> {
        let allowed: HashSet<&str> = inputs.models().collect();
        let query = tokenize(&inputs.task_prompt);
        let mut best: Option<(usize, f64)> = None;
        for (idx, demo) in self.demos.iter().enumerate() {
            if !allowed.is_empty() && !allowed.contains(demo.label.recommended_model.as_str()) {
                continue;
            }
            let same_type = if demo.inputs.task_type_hint == inputs.task_type_hint { 1.0 } else { 0.0 };
            let similarity = same_type + jaccard(&query, &self.demo_tokens[idx]);
            if best.map_or(true, |(_, s)| similarity > s) {
                best = Some((idx, similarity));
            }
        }
        best.map(|(idx, _)| &self.demos[idx])
    }
}

impl Predictor for FewShotPredictor {
    fn predict(&self, inputs: &ExampleInputs) -> Result<Prediction, PredictionError> {
        self.nearest(inputs)
            .map(|demo| Prediction::from(&demo.label))
            .ok_or(PredictionError::NoDemonstrations)
    }
}
