//! Wavemill Eval — routing metric, predictors, evaluator and artifact handling.
//!
//! Modules:
//! - `metric`: weighted model / risk-recall / cost score for one prediction
//! - `predictor`: sync and async policy interfaces, heuristic baseline, few-shot policy
//! - `evaluator`: aggregate accuracy, macro risk recall/precision, failure substitution
//! - `artifact`: optimized-selector JSON document
//! - `optimizer`: offline few-shot selection producing an artifact
//! - `report`: comparison table

pub mod artifact;
pub mod evaluator;
pub mod metric;
pub mod optimizer;
pub mod predictor;
pub mod report;

pub use artifact::{data_hash, load_artifact, save_artifact, ArtifactMetadata, SelectorArtifact};
pub use evaluator::{aggregate, evaluate, EvaluationResult, Evaluator};
pub use metric::{routing_metric, score_breakdown, MetricBreakdown};
pub use optimizer::{optimize, select_demos, OptimizationReport, OptimizeOptions};
pub use predictor::{
    from_fn, AsyncPredictor, Blocking, FewShotPredictor, HeuristicBaseline, PredictionError, Predictor,
};
pub use report::{Comparison, ComparisonRow};
