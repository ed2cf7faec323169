//! Side-by-side comparison of a baseline and a candidate policy.

use crate::evaluator::EvaluationResult;
use std::fmt;

const METRICS: [(&str, fn(&EvaluationResult) -> f64); 5] = [
    ("Model Accuracy", |r| r.model_accuracy),
    ("Cost Accuracy", |r| r.cost_accuracy),
    ("Risk Recall", |r| r.risk_recall),
    ("Risk Precision", |r| r.risk_precision),
    ("Routing Score", |r| r.routing_score),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub metric: &'static str,
    pub baseline: f64,
    pub candidate: Option<f64>,
}

impl ComparisonRow {
    pub fn delta(&self) -> Option<f64> {
        self.candidate.map(|c| c - self.baseline)
    }
}

/// Comparison table; the candidate column is omitted when there is no candidate.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub baseline: EvaluationResult,
    pub candidate: Option<EvaluationResult>,
}

impl Comparison {
    pub fn new(baseline: EvaluationResult, candidate: Option<EvaluationResult>) -> Self {
        Self { baseline, candidate }
    }

    pub fn rows(&self) -> Vec<ComparisonRow> {
        METRICS
            .iter()
            .map(|&(metric, get)| ComparisonRow {
                metric,
                baseline: get(&self.baseline),
                candidate: self.candidate.as_ref().map(get),
            })
            .collect()
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = |c: char| c.to_string().repeat(70);
        writeln!(f, "{}", rule('='))?;
        write!(f, "{:<25} {:>15}", "Metric", "Heuristic")?;
        if self.candidate.is_some() {
            write!(f, " {:>15} {:>10}", "Optimized", "Delta")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", rule('-'))?;

        for row in self.rows() {
            write!(f, "{:<25} {:>14.1}%", row.metric, row.baseline * 100.0)?;
            if let (Some(candidate), Some(delta)) = (row.candidate, row.delta()) {
                write!(f, " {:>14.1}% {:>+9.1}%", candidate * 100.0, delta * 100.0)?;
            }
            writeln!(f)?;
        }
        write!(f, "{}", rule('='))
    }
}
