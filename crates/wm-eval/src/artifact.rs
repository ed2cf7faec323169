//! Optimized-selector artifact: the JSON document handed to the runtime router.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::Path;
use wm_core::{
    Confidence, CostBand, ExampleInputs, LabeledExample, Result, RiskFlag, RoutingLabel, SelectorError, TaskType,
    SELECTOR_CONFIG,
};
use wm_router::resolve_agent;

pub const ARTIFACT_VERSION: &str = "1.0.0";

/// Instruction text shipped as the artifact's system prompt.
pub const SELECTOR_INSTRUCTIONS: &str = "Route a software engineering task to the best AI agent and model.\n\n\
Consider task complexity, whether it modifies existing code or creates new code, the target \
repository's technology stack, and historical performance patterns. Prefer cheaper models when \
both options have similar expected outcomes.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactMetadata {
    pub training_records: usize,
    pub validation_records: usize,
    pub val_score: f64,
    pub data_source: String,
    pub data_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorArtifact {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub optimizer: Option<String>,
    pub teacher_model: String,
    pub runtime_model: String,
    pub system_prompt: String,
    #[serde(deserialize_with = "lenient_demos")]
    pub few_shot_examples: Vec<LabeledExample>,
    pub model_candidates: Vec<String>,
    pub metadata: ArtifactMetadata,
}

/// Risk flags of a stored demo: a list, or one comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFlags {
    List(Vec<Option<String>>),
    Text(String),
}

impl RawFlags {
    fn names(self) -> Vec<String> {
        match self {
            RawFlags::List(items) => items.into_iter().flatten().collect(),
            RawFlags::Text(text) => text
                .trim_matches(|c| c == '[' || c == ']')
                .split(',')
                .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
                .filter(|f| !f.is_empty())
                .collect(),
        }
    }
}

/// A demo as another optimizer may have written it: every field free-form text.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDemo {
    task_prompt: Option<String>,
    repo_name: Option<String>,
    task_type_hint: Option<String>,
    available_models: Option<String>,
    recommended_model: Option<String>,
    recommended_agent: Option<String>,
    confidence: Option<String>,
    risk_flags: Option<RawFlags>,
    cost_estimate: Option<String>,
    reasoning: Option<String>,
}

impl RawDemo {
    /// Typed demo, or `None` when it names no model. Unknown enum values fall back to
    /// neutral ones; unknown flags are dropped.
    fn into_example(self, idx: usize) -> Option<LabeledExample> {
        let model = self.recommended_model.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
        let Some(recommended_model) = model else {
            tracing::warn!(demo = idx, "skipping demo without recommended_model");
            return None;
        };

        let mut risk_flags = BTreeSet::new();
        for name in self.risk_flags.map(RawFlags::names).unwrap_or_default() {
            match name.parse::<RiskFlag>() {
                Ok(flag) => {
                    risk_flags.insert(flag);
                }
                Err(e) => tracing::warn!(demo = idx, error = %e, "dropping unknown risk flag"),
            }
        }

        let text = |field: Option<String>| field.unwrap_or_default();
        let recommended_agent = self
            .recommended_agent
            .and_then(|a| a.parse().ok())
            .unwrap_or_else(|| resolve_agent(&recommended_model, &SELECTOR_CONFIG.models.agents));

        Some(LabeledExample {
            inputs: ExampleInputs {
                task_prompt: text(self.task_prompt),
                repo_name: text(self.repo_name),
                task_type_hint: self.task_type_hint.and_then(|t| t.parse().ok()).unwrap_or(TaskType::Unknown),
                available_models: text(self.available_models),
            },
            label: RoutingLabel {
                recommended_agent,
                confidence: self.confidence.and_then(|c| c.parse().ok()).unwrap_or(Confidence::Medium),
                risk_flags,
                cost_estimate: self.cost_estimate.and_then(|c| c.parse().ok()).unwrap_or(CostBand::Medium),
                reasoning: text(self.reasoning),
                recommended_model,
            },
        })
    }
}

fn lenient_demos<'de, D>(deserializer: D) -> std::result::Result<Vec<LabeledExample>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<RawDemo>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(idx, demo)| demo.into_example(idx))
        .collect())
}

/// `sha256:` plus the first 16 hex digits of the digest.
pub fn data_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = format!("{:x}", hasher.finalize());
    format!("sha256:{}", &digest[..16])
}

pub fn load_artifact(path: impl AsRef<Path>) -> Result<SelectorArtifact> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SelectorError::ArtifactNotFound { path: path.to_path_buf() });
    }
    let content = std::fs::read_to_string(path)?;
    let artifact: SelectorArtifact = serde_json::from_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        demos = artifact.few_shot_examples.len(),
        val_score = artifact.metadata.val_score,
        "loaded selector artifact"
    );
    Ok(artifact)
}

/// Write the artifact as pretty JSON, creating parent directories.
pub fn save_artifact(path: impl AsRef<Path>, artifact: &SelectorArtifact) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(artifact)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}
