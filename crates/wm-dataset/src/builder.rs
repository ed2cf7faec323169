//! Dataset builder: records -> labeled examples.

use crate::jsonl::{parse_line, LineRejection};
use std::path::Path;
use wm_core::{ExampleInputs, HistoricalRecord, LabeledExample, Result, SelectorConfig, SelectorError};
use wm_router::{classify_task_type, derive_optimal_routing, RuleSet, RULES};

/// Longest prefix of `text` with at most `max_chars` characters.
///
/// Idempotent, and never splits a multi-byte character.
pub fn truncate_prompt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Positional split: the first `floor(len * ratio)` examples train, the rest validate.
pub fn split_examples(examples: &[LabeledExample], ratio: f64) -> (&[LabeledExample], &[LabeledExample]) {
    let ratio = ratio.clamp(0.0, 1.0);
    let idx = ((examples.len() as f64) * ratio).floor() as usize;
    examples.split_at(idx.min(examples.len()))
}

/// Examples plus counts of skipped lines.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub examples: Vec<LabeledExample>,
    pub malformed: usize,
    pub missing_prompt: usize,
}

impl BuildOutcome {
    pub fn skipped(&self) -> usize {
        self.malformed + self.missing_prompt
    }
}

pub struct DatasetBuilder<'r> {
    config: SelectorConfig,
    rules: &'r RuleSet,
    max_prompt_length: usize,
}

impl DatasetBuilder<'static> {
    /// Builder using the default rule tables.
    pub fn new(config: SelectorConfig) -> Self {
        Self::with_rules(config, &RULES)
    }
}

impl<'r> DatasetBuilder<'r> {
    pub fn with_rules(config: SelectorConfig, rules: &'r RuleSet) -> Self {
        let max_prompt_length = config.dataset.max_prompt_length;
        Self { config, rules, max_prompt_length }
    }

    pub fn max_prompt_length(mut self, max_chars: usize) -> Self {
        self.max_prompt_length = max_chars;
        self
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Label one record. The task-type hint is computed on the full prompt.
    pub fn example(&self, record: &HistoricalRecord) -> LabeledExample {
        let prompt = &record.original_prompt;
        LabeledExample {
            inputs: ExampleInputs {
                task_prompt: truncate_prompt(prompt, self.max_prompt_length).to_string(),
                repo_name: record.repo().to_string(),
                task_type_hint: classify_task_type(prompt, self.rules),
                available_models: self.config.models.available_models(),
            },
            label: derive_optimal_routing(record, self.rules, &self.config),
        }
    }

    /// Build examples from raw lines, skipping unusable ones. Input order is preserved.
    pub fn build<I, S>(&self, lines: I) -> BuildOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcome = BuildOutcome::default();
        for (idx, line) in lines.into_iter().enumerate() {
            match parse_line(line.as_ref()) {
                Ok(record) => outcome.examples.push(self.example(&record)),
                Err(LineRejection::Blank) => {}
                Err(LineRejection::Malformed) => {
                    tracing::debug!(line = idx + 1, "skipping malformed record");
                    outcome.malformed += 1;
                }
                Err(LineRejection::MissingPrompt) => {
                    tracing::debug!(line = idx + 1, "skipping record without originalPrompt");
                    outcome.missing_prompt += 1;
                }
            }
        }

        tracing::info!(
            examples = outcome.examples.len(),
            malformed = outcome.malformed,
            missing_prompt = outcome.missing_prompt,
            "built routing dataset"
        );
        outcome
    }

    pub fn build_from_str(&self, content: &str) -> Vec<LabeledExample> {
        self.build(content.lines()).examples
    }

    /// Load and label a JSONL file.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Vec<LabeledExample>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SelectorError::DataNotFound { path: path.to_path_buf() });
        }
        let content = std::fs::read_to_string(path)?;
        Ok(self.build_from_str(&content))
    }
}
