use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned by the `FromStr` impls when a string names no known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

fn parse_variant<T: Copy>(
    all: &[T],
    name: fn(&T) -> &'static str,
    kind: &'static str,
    s: &str,
) -> Result<T, UnknownVariant> {
    let wanted = s.trim();
    all.iter()
        .copied()
        .find(|v| name(v).eq_ignore_ascii_case(wanted))
        .ok_or_else(|| UnknownVariant { kind, value: s.to_string() })
}

/// Agent CLI that executes a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agent {
    Claude,
    Codex,
}

impl Agent {
    pub const ALL: [Agent; 2] = [Agent::Claude, Agent::Codex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Agent::Claude => "claude",
            Agent::Codex => "codex",
        }
    }

    /// Capitalized name used in human-facing reasoning strings.
    pub fn display_name(&self) -> &'static str {
        match self {
            Agent::Claude => "Claude",
            Agent::Codex => "Codex",
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Agent {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(&Self::ALL, Self::as_str, "agent", s)
    }
}

/// Routing confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub const ALL: [Confidence; 3] = [Confidence::High, Confidence::Medium, Confidence::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(&Self::ALL, Self::as_str, "confidence", s)
    }
}

/// Expected workflow cost band. Ordered: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostBand {
    Low,
    Medium,
    High,
}

impl CostBand {
    pub const ALL: [CostBand; 3] = [CostBand::Low, CostBand::Medium, CostBand::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            CostBand::Low => "low",
            CostBand::Medium => "medium",
            CostBand::High => "high",
        }
    }
}

impl fmt::Display for CostBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostBand {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(&Self::ALL, Self::as_str, "cost band", s)
    }
}

/// Closed vocabulary of execution-risk signals.
///
/// Declaration order is the canonical output order of a flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskFlag {
    ModifiesExistingRuntime,
    SchemaMigration,
    LargeScopeRefactor,
    CrossService,
    RscSerialization,
    TestInfrastructure,
}

impl RiskFlag {
    pub const ALL: [RiskFlag; 6] = [
        RiskFlag::ModifiesExistingRuntime,
        RiskFlag::SchemaMigration,
        RiskFlag::LargeScopeRefactor,
        RiskFlag::CrossService,
        RiskFlag::RscSerialization,
        RiskFlag::TestInfrastructure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFlag::ModifiesExistingRuntime => "modifies-existing-runtime",
            RiskFlag::SchemaMigration => "schema-migration",
            RiskFlag::LargeScopeRefactor => "large-scope-refactor",
            RiskFlag::CrossService => "cross-service",
            RiskFlag::RscSerialization => "rsc-serialization",
            RiskFlag::TestInfrastructure => "test-infrastructure",
        }
    }
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskFlag {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(&Self::ALL, Self::as_str, "risk flag", s)
    }
}

/// Coarse task category used as a hint input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Bugfix,
    Refactor,
    Test,
    Documentation,
    Infrastructure,
    Feature,
    Unknown,
}

impl TaskType {
    pub const ALL: [TaskType; 7] = [
        TaskType::Bugfix,
        TaskType::Refactor,
        TaskType::Test,
        TaskType::Documentation,
        TaskType::Infrastructure,
        TaskType::Feature,
        TaskType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Bugfix => "bugfix",
            TaskType::Refactor => "refactor",
            TaskType::Test => "test",
            TaskType::Documentation => "documentation",
            TaskType::Infrastructure => "infrastructure",
            TaskType::Feature => "feature",
            TaskType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(&Self::ALL, Self::as_str, "task type", s)
    }
}

const UNKNOWN_REPO: &str = "unknown";

/// `null` reads as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Non-negative whole number, written either as an integer or as a float like `2.0`.
fn whole_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(v) if v.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&v) => Ok(Some(v as u32)),
        Some(v) => Err(D::Error::custom(format!("expected a non-negative whole count, got {v}"))),
    }
}

/// One completed historical task run, as written by the eval aggregator.
///
/// Every field except the prompt is optional; `null` is treated like an absent field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_prompt: String,
    #[serde(default)]
    pub source_repo: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "whole_count")]
    pub intervention_count: Option<u32>,
    #[serde(default)]
    pub workflow_cost: Option<f64>,
}

impl HistoricalRecord {
    pub fn new(prompt: impl Into<String>, model_id: impl Into<String>, score: f64) -> Self {
        Self {
            original_prompt: prompt.into(),
            source_repo: None,
            model_id: Some(model_id.into()),
            score: Some(score),
            intervention_count: Some(0),
            workflow_cost: None,
        }
    }

    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.source_repo = Some(repo.into());
        self
    }

    pub fn with_interventions(mut self, count: u32) -> Self {
        self.intervention_count = Some(count);
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.workflow_cost = Some(cost);
        self
    }

    /// Repository the task ran against, `unknown` when the record does not say.
    pub fn repo(&self) -> &str {
        self.source_repo.as_deref().unwrap_or(UNKNOWN_REPO)
    }

    /// Model used for the run, or `default` when the record does not say.
    pub fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.model_id.as_deref().unwrap_or(default)
    }

    pub fn score(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    pub fn interventions(&self) -> u32 {
        self.intervention_count.unwrap_or(0)
    }
}

/// Ground-truth (or predicted) routing decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingLabel {
    pub recommended_model: String,
    pub recommended_agent: Agent,
    pub confidence: Confidence,
    #[serde(default)]
    pub risk_flags: BTreeSet<RiskFlag>,
    pub cost_estimate: CostBand,
    pub reasoning: String,
}

/// Inputs a routing policy sees for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleInputs {
    pub task_prompt: String,
    pub repo_name: String,
    pub task_type_hint: TaskType,
    /// Comma-separated model ids the policy may choose from.
    pub available_models: String,
}

impl ExampleInputs {
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.available_models
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Inputs plus derived label. Serialized flat, which is also the few-shot demo shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    #[serde(flatten)]
    pub inputs: ExampleInputs,
    #[serde(flatten)]
    pub label: RoutingLabel,
}

/// Output of any routing policy. Every field may be missing or free-form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prediction {
    pub recommended_model: Option<String>,
    pub recommended_agent: Option<String>,
    pub confidence: Option<String>,
    pub risk_flags: Vec<String>,
    pub cost_estimate: Option<String>,
    pub reasoning: Option<String>,
}

impl Prediction {
    pub fn flag_set(&self) -> BTreeSet<&str> {
        self.risk_flags.iter().map(|f| f.trim()).collect()
    }
}

impl From<&RoutingLabel> for Prediction {
    fn from(label: &RoutingLabel) -> Self {
        Self {
            recommended_model: Some(label.recommended_model.clone()),
            recommended_agent: Some(label.recommended_agent.to_string()),
            confidence: Some(label.confidence.to_string()),
            risk_flags: label.risk_flags.iter().map(|f| f.to_string()).collect(),
            cost_estimate: Some(label.cost_estimate.to_string()),
            reasoning: Some(label.reasoning.clone()),
        }
    }
}

impl From<RoutingLabel> for Prediction {
    fn from(label: RoutingLabel) -> Self {
        Prediction::from(&label)
    }
}
