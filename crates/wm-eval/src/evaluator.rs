//! Offline evaluation of a routing policy against derived labels.

use crate::metric::routing_metric;
use crate::predictor::{AsyncPredictor, HeuristicBaseline, PredictionError, Predictor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use wm_core::{LabeledExample, Prediction, SelectorConfig};

/// Aggregate statistics for one policy over one example set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub label: String,
    pub n: usize,
    pub model_accuracy: f64,
    pub cost_accuracy: f64,
    /// Macro average over examples with at least one true flag; 1.0 when there are none.
    pub risk_recall: f64,
    pub risk_precision: f64,
    pub risk_examples: usize,
    /// Mean routing metric.
    pub routing_score: f64,
    /// Predictions replaced by the baseline after the policy failed.
    pub failures: usize,
}

/// Fold per-example predictions into an [`EvaluationResult`].
///
/// `predictions[i]` must belong to `examples[i]`.
pub fn aggregate(label: &str, examples: &[LabeledExample], predictions: &[Prediction], failures: usize) -> EvaluationResult {
    let mut correct_model = 0usize;
    let mut correct_cost = 0usize;
    let mut recall_sum = 0.0;
    let mut precision_sum = 0.0;
    let mut risk_examples = 0usize;
    let mut score_sum = 0.0;

    for (ex, pred) in examples.iter().zip(predictions) {
        let truth = &ex.label;
        if pred.recommended_model.as_deref() == Some(truth.recommended_model.as_str()) {
            correct_model += 1;
        }
        if pred.cost_estimate.as_deref() == Some(truth.cost_estimate.as_str()) {
            correct_cost += 1;
        }

        let true_flags: BTreeSet<&str> = truth.risk_flags.iter().map(|f| f.as_str()).collect();
        let pred_flags = pred.flag_set();
        if !true_flags.is_empty() {
            risk_examples += 1;
            let hits = true_flags.intersection(&pred_flags).count() as f64;
            recall_sum += hits / true_flags.len() as f64;
            if !pred_flags.is_empty() {
                precision_sum += hits / pred_flags.len() as f64;
            }
        }

        score_sum += routing_metric(truth, pred);
    }

    let n = examples.len().min(predictions.len());
    let ratio = |count: f64| if n > 0 { count / n as f64 } else { 0.0 };
    let risk_mean = |sum: f64| if risk_examples > 0 { sum / risk_examples as f64 } else { 1.0 };

    EvaluationResult {
        label: label.to_string(),
        n,
        model_accuracy: ratio(correct_model as f64),
        cost_accuracy: ratio(correct_cost as f64),
        risk_recall: risk_mean(recall_sum),
        risk_precision: risk_mean(precision_sum),
        risk_examples,
        routing_score: ratio(score_sum),
        failures,
    }
}

/// Runs predictors over labeled examples, substituting the baseline for failed predictions.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    fallback: HeuristicBaseline,
}

impl Evaluator {
    pub fn new(config: &SelectorConfig) -> Self {
        Self { fallback: HeuristicBaseline::new(config) }
    }

    fn settle(&self, idx: usize, outcome: Result<Prediction, PredictionError>, failures: &mut usize) -> Prediction {
        match outcome {
            Ok(prediction) => prediction,
            Err(e) => {
                tracing::warn!(example = idx, error = %e, "prediction failed, substituting baseline");
                *failures += 1;
                self.fallback.prediction()
            }
        }
    }

    pub fn evaluate<P: Predictor + ?Sized>(&self, examples: &[LabeledExample], predictor: &P, label: &str) -> EvaluationResult {
        let mut failures = 0;
        let predictions: Vec<Prediction> = examples
            .iter()
            .enumerate()
            .map(|(idx, ex)| self.settle(idx, predictor.predict(&ex.inputs), &mut failures))
            .collect();
        aggregate(label, examples, &predictions, failures)
    }

    /// Evaluate with up to `concurrency` predictions in flight.
    ///
    /// Each prediction runs in its own task; results are gathered by position and folded
    /// only after every task has finished. A panicking task counts as a failure.
    pub async fn evaluate_concurrent<P>(
        &self,
        examples: &[LabeledExample],
        predictor: Arc<P>,
        label: &str,
        concurrency: usize,
    ) -> EvaluationResult
    where
        P: AsyncPredictor + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let handles: Vec<_> = examples
            .iter()
            .map(|ex| {
                let predictor = Arc::clone(&predictor);
                let semaphore = Arc::clone(&semaphore);
                let inputs = ex.inputs.clone();
                tokio::spawn(async move {
                    match semaphore.acquire_owned().await {
                        Ok(_permit) => predictor.predict(&inputs).await,
                        Err(e) => Err(PredictionError::Failed(e.to_string())),
                    }
                })
            })
            .collect();

        let mut failures = 0;
        let mut predictions = Vec::with_capacity(handles.len());
        for (idx, handle) in handles.into_iter().enumerate() {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(e) => Err(PredictionError::Failed(format!("prediction task aborted: {e}"))),
            };
            predictions.push(self.settle(idx, outcome, &mut failures));
        }
        aggregate(label, examples, &predictions, failures)
    }
}

/// Evaluate with the default fallback.
pub fn evaluate<P: Predictor + ?Sized>(examples: &[LabeledExample], predictor: &P, label: &str) -> EvaluationResult {
    Evaluator::default().evaluate(examples, predictor, label)
}
