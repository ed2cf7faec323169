//! Wavemill Router — pattern matchers and hindsight label derivation for task routing.
//!
//! Matchers are rule tables (category -> patterns -> threshold) in [`config`]; the
//! derivation policy in [`labels`] is an ordered list of guarded branches.

pub mod config;
pub mod labels;
pub mod rules;
pub mod selector;

pub use config::{default_rules, RULES};
pub use labels::{
    build_reasoning, derive_confidence, derive_cost_band, derive_optimal_routing, ReasoningTemplate,
    RecordSignals, RoutingBranch,
};
pub use rules::{
    classify_task_type, detect_risk_flags, greenfield_counts, is_greenfield, GreenfieldCounts, PatternRule,
    RuleSet,
};
pub use selector::resolve_agent;

use wm_core::{HistoricalRecord, RoutingLabel, SELECTOR_CONFIG};

/// Derive a label with the default rules and config.
pub fn derive_label(record: &HistoricalRecord) -> RoutingLabel {
    derive_optimal_routing(record, &RULES, &SELECTOR_CONFIG)
}
