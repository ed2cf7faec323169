//! Selector configuration. `Default` reproduces the reference routing policy.

use crate::error::{Result, SelectorError};
use crate::types::Agent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub models: ModelConfig,
    pub thresholds: ThresholdConfig,
    pub cost_bands: CostBandConfig,
    pub dataset: DatasetConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Conservative fallback model.
    pub default_model: String,
    /// Cheaper candidate preferred for clean greenfield work.
    pub alternate_model: String,
    /// Models offered to a policy as `available_models`.
    pub available: Vec<String>,
    /// Models listed in exported artifacts.
    pub candidates: Vec<String>,
    /// Explicit model -> agent table, consulted before prefix rules.
    pub agents: BTreeMap<String, Agent>,
    pub teacher_model: String,
    pub runtime_model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let agents = [
            ("claude-opus-4-6", Agent::Claude),
            ("claude-sonnet-4-5-20250929", Agent::Claude),
            ("claude-haiku-4-5-20251001", Agent::Claude),
            ("gpt-5.3-codex", Agent::Codex),
        ]
        .into_iter()
        .map(|(m, a)| (m.to_string(), a))
        .collect();

        Self {
            default_model: "claude-sonnet-4-5-20250929".into(),
            alternate_model: "gpt-5.3-codex".into(),
            available: vec!["claude-sonnet-4-5-20250929".into(), "gpt-5.3-codex".into()],
            candidates: vec![
                "claude-sonnet-4-5-20250929".into(),
                "gpt-5.3-codex".into(),
                "claude-opus-4-6".into(),
                "claude-haiku-4-5-20251001".into(),
            ],
            agents,
            teacher_model: "claude-sonnet-4-5-20250929".into(),
            runtime_model: "claude-haiku-4-5-20251001".into(),
        }
    }
}

impl ModelConfig {
    pub fn available_models(&self) -> String {
        self.available.join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Minimum score for an outcome to count as a success.
    pub success_score: f64,
    /// Minimum score for a greenfield success to license the alternate model.
    pub greenfield_score: f64,
    /// Most interventions still compatible with keeping the used model.
    pub max_interventions_kept: u32,
    pub high_confidence_score: f64,
    pub medium_confidence_score: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            success_score: 0.85,
            greenfield_score: 0.90,
            max_interventions_kept: 1,
            high_confidence_score: 0.95,
            medium_confidence_score: 0.80,
        }
    }
}

/// Breakpoints in dollars: `cost < low_below` is low, `cost <= medium_up_to` is medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostBandConfig {
    pub low_below: f64,
    pub medium_up_to: f64,
}

impl Default for CostBandConfig {
    fn default() -> Self {
        Self { low_below: 10.0, medium_up_to: 25.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Prompt truncation length, in characters.
    pub max_prompt_length: usize,
    /// Fraction of examples used for training; the rest is validation.
    pub train_split: f64,
    pub min_examples: usize,
    pub max_demos: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            max_prompt_length: 2000,
            train_split: 0.8,
            min_examples: 10,
            max_demos: 4,
        }
    }
}

impl SelectorConfig {
    /// Load a JSON config file. Missing sections fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: SelectorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "loaded selector config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(SelectorError::InvalidConfig(format!("{name} must be in [0, 1], got {v}")))
            }
        };
        let t = &self.thresholds;
        unit("thresholds.success_score", t.success_score)?;
        unit("thresholds.greenfield_score", t.greenfield_score)?;
        unit("thresholds.high_confidence_score", t.high_confidence_score)?;
        unit("thresholds.medium_confidence_score", t.medium_confidence_score)?;
        unit("dataset.train_split", self.dataset.train_split)?;

        if self.cost_bands.low_below > self.cost_bands.medium_up_to {
            return Err(SelectorError::InvalidConfig(format!(
                "cost_bands.low_below ({}) exceeds cost_bands.medium_up_to ({})",
                self.cost_bands.low_below, self.cost_bands.medium_up_to
            )));
        }
        if self.models.default_model.trim().is_empty() || self.models.alternate_model.trim().is_empty() {
            return Err(SelectorError::InvalidConfig("model ids must not be empty".into()));
        }
        if self.dataset.max_prompt_length == 0 {
            return Err(SelectorError::InvalidConfig("dataset.max_prompt_length must be positive".into()));
        }
        Ok(())
    }
}

/// The default config instance.
pub static SELECTOR_CONFIG: std::sync::LazyLock<SelectorConfig> =
    std::sync::LazyLock::new(SelectorConfig::default);
