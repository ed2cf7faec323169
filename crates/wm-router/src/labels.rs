//! Label derivation: turn one historical outcome into the routing decision that would have
//! been optimal in hindsight.

use crate::rules::{detect_risk_flags, is_greenfield, RuleSet};
use crate::selector::resolve_agent;
use std::collections::BTreeSet;
use wm_core::config::{CostBandConfig, ThresholdConfig};
use wm_core::{Agent, Confidence, CostBand, HistoricalRecord, RiskFlag, RoutingLabel, SelectorConfig};

/// Outcome signals of one record, with absent fields already defaulted.
#[derive(Debug, Clone, Copy)]
pub struct RecordSignals<'a> {
    pub model_id: &'a str,
    pub score: f64,
    pub interventions: u32,
    pub greenfield: bool,
}

impl<'a> RecordSignals<'a> {
    pub fn from_record(record: &'a HistoricalRecord, rules: &RuleSet, config: &'a SelectorConfig) -> Self {
        Self {
            model_id: record.model_or(&config.models.default_model),
            score: record.score(),
            interventions: record.interventions(),
            greenfield: is_greenfield(&record.original_prompt, rules),
        }
    }
}

/// Model-selection branches of the derivation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingBranch {
    /// The cheap model scored below the success threshold: should have used the safe model.
    CheapModelFailed,
    /// Clean greenfield success: the cheap model is licensed for similar work.
    GreenfieldSuccess,
    /// The model used performed adequately.
    KeepUsedModel,
    SafeDefault,
}

impl RoutingBranch {
    /// Evaluation order. The first branch whose guard holds wins.
    pub const ORDER: [RoutingBranch; 4] = [
        RoutingBranch::CheapModelFailed,
        RoutingBranch::GreenfieldSuccess,
        RoutingBranch::KeepUsedModel,
        RoutingBranch::SafeDefault,
    ];

    pub fn applies(&self, signals: &RecordSignals<'_>, config: &SelectorConfig) -> bool {
        let t = &config.thresholds;
        match self {
            RoutingBranch::CheapModelFailed => {
                signals.model_id == config.models.alternate_model && signals.score < t.success_score
            }
            RoutingBranch::GreenfieldSuccess => {
                signals.greenfield && signals.score >= t.greenfield_score && signals.interventions == 0
            }
            RoutingBranch::KeepUsedModel => {
                signals.score >= t.success_score && signals.interventions <= t.max_interventions_kept
            }
            RoutingBranch::SafeDefault => true,
        }
    }

    pub fn select(signals: &RecordSignals<'_>, config: &SelectorConfig) -> Self {
        Self::ORDER
            .into_iter()
            .find(|branch| branch.applies(signals, config))
            .unwrap_or(RoutingBranch::SafeDefault)
    }

    pub fn recommended_model<'a>(&self, signals: &RecordSignals<'a>, config: &'a SelectorConfig) -> &'a str {
        match self {
            RoutingBranch::CheapModelFailed | RoutingBranch::SafeDefault => &config.models.default_model,
            RoutingBranch::GreenfieldSuccess => &config.models.alternate_model,
            RoutingBranch::KeepUsedModel => signals.model_id,
        }
    }
}

pub fn derive_confidence(score: f64, interventions: u32, thresholds: &ThresholdConfig) -> Confidence {
    if score >= thresholds.high_confidence_score && interventions == 0 {
        Confidence::High
    } else if score >= thresholds.medium_confidence_score {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Missing cost maps to the middle band.
pub fn derive_cost_band(cost: Option<f64>, bands: &CostBandConfig) -> CostBand {
    match cost {
        None => CostBand::Medium,
        Some(c) if c < bands.low_below => CostBand::Low,
        Some(c) if c <= bands.medium_up_to => CostBand::Medium,
        Some(_) => CostBand::High,
    }
}

/// One-sentence explanations, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningTemplate {
    GreenfieldAlternate,
    RiskFlags,
    HighConfidence,
    Default,
}

impl ReasoningTemplate {
    pub fn select(
        model: &str,
        risk_flags: &BTreeSet<RiskFlag>,
        greenfield: bool,
        score: f64,
        config: &SelectorConfig,
    ) -> Self {
        if greenfield && model == config.models.alternate_model {
            ReasoningTemplate::GreenfieldAlternate
        } else if !risk_flags.is_empty() {
            ReasoningTemplate::RiskFlags
        } else if score >= config.thresholds.high_confidence_score {
            ReasoningTemplate::HighConfidence
        } else {
            ReasoningTemplate::Default
        }
    }

    pub fn render(&self, agent: Agent, risk_flags: &BTreeSet<RiskFlag>) -> String {
        match self {
            ReasoningTemplate::GreenfieldAlternate => {
                format!("Greenfield task suitable for {} at lower cost.", agent.display_name())
            }
            ReasoningTemplate::RiskFlags => {
                let flags: Vec<&str> = risk_flags.iter().map(|f| f.as_str()).collect();
                format!("Risk flags [{}] suggest using {}.", flags.join(", "), agent)
            }
            ReasoningTemplate::HighConfidence => {
                format!("High-confidence routing to {} based on historical success.", agent)
            }
            ReasoningTemplate::Default => format!("Default routing to {}.", agent),
        }
    }
}

pub fn build_reasoning(
    model: &str,
    risk_flags: &BTreeSet<RiskFlag>,
    greenfield: bool,
    score: f64,
    config: &SelectorConfig,
) -> String {
    let agent = resolve_agent(model, &config.models.agents);
    ReasoningTemplate::select(model, risk_flags, greenfield, score, config).render(agent, risk_flags)
}

/// Derive the optimal routing label for one record. Never fails.
pub fn derive_optimal_routing(record: &HistoricalRecord, rules: &RuleSet, config: &SelectorConfig) -> RoutingLabel {
    let signals = RecordSignals::from_record(record, rules, config);
    let branch = RoutingBranch::select(&signals, config);
    let recommended_model = branch.recommended_model(&signals, config).to_string();
    let risk_flags = detect_risk_flags(&record.original_prompt, rules);

    tracing::trace!(?branch, model = %recommended_model, flags = risk_flags.len(), "derived routing label");

    RoutingLabel {
        recommended_agent: resolve_agent(&recommended_model, &config.models.agents),
        confidence: derive_confidence(signals.score, signals.interventions, &config.thresholds),
        cost_estimate: derive_cost_band(record.workflow_cost, &config.cost_bands),
        reasoning: build_reasoning(&recommended_model, &risk_flags, signals.greenfield, signals.score, config),
        risk_flags,
        recommended_model,
    }
}
