//! Weighted routing metric, shared by optimization and offline evaluation.

use std::collections::BTreeSet;
use wm_core::{Prediction, RoutingLabel};

pub const MODEL_WEIGHT: f64 = 0.5;
pub const RISK_WEIGHT: f64 = 0.3;
pub const COST_WEIGHT: f64 = 0.2;

/// Score given to a flagged prediction when the truth has no flags.
const FALSE_POSITIVE_RISK_SCORE: f64 = 0.5;

/// Per-component scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricBreakdown {
    pub model: f64,
    pub risk: f64,
    pub cost: f64,
}

impl MetricBreakdown {
    pub fn score(&self) -> f64 {
        MODEL_WEIGHT * self.model + RISK_WEIGHT * self.risk + COST_WEIGHT * self.cost
    }
}

/// Risk-flag recall, with the light false-positive penalty when `truth` is empty.
pub fn risk_recall(truth: &BTreeSet<&str>, predicted: &BTreeSet<&str>) -> f64 {
    if truth.is_empty() {
        return if predicted.is_empty() { 1.0 } else { FALSE_POSITIVE_RISK_SCORE };
    }
    truth.intersection(predicted).count() as f64 / truth.len() as f64
}

pub fn score_breakdown(truth: &RoutingLabel, prediction: &Prediction) -> MetricBreakdown {
    let model_ok = prediction.recommended_model.as_deref() == Some(truth.recommended_model.as_str());
    let cost_ok = prediction.cost_estimate.as_deref() == Some(truth.cost_estimate.as_str());

    let true_flags: BTreeSet<&str> = truth.risk_flags.iter().map(|f| f.as_str()).collect();
    let predicted_flags = prediction.flag_set();

    MetricBreakdown {
        model: if model_ok { 1.0 } else { 0.0 },
        risk: risk_recall(&true_flags, &predicted_flags),
        cost: if cost_ok { 1.0 } else { 0.0 },
    }
}

/// 0.5 model match + 0.3 risk recall + 0.2 cost match. Always in [0, 1].
pub fn routing_metric(truth: &RoutingLabel, prediction: &Prediction) -> f64 {
    score_breakdown(truth, prediction).score()
}
