//! Keyword-pattern matchers with per-category vote thresholds.

use regex::Regex;
use std::collections::BTreeSet;
use wm_core::{RiskFlag, TaskType};

/// One category of a rule table: a label, its patterns, and how many of them must match.
#[derive(Debug, Clone)]
pub struct PatternRule<L> {
    pub label: L,
    pub patterns: Vec<Regex>,
    /// Always at least 1, so a category with no matching pattern can never fire.
    pub threshold: usize,
}

impl<L: Copy> PatternRule<L> {
    pub fn new(label: L, patterns: Vec<Regex>, threshold: usize) -> Self {
        Self { label, patterns, threshold: threshold.max(1) }
    }

    /// Compile `patterns` into a rule.
    pub fn compile(label: L, patterns: &[&str], threshold: usize) -> Result<Self, regex::Error> {
        let patterns = patterns.iter().map(|p| Regex::new(p)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(label, patterns, threshold))
    }

    /// Number of distinct patterns found anywhere in `text`.
    pub fn match_count(&self, text: &str) -> usize {
        self.patterns.iter().filter(|p| p.is_match(text)).count()
    }

    pub fn fires(&self, text: &str) -> bool {
        self.match_count(text) >= self.threshold
    }
}

/// All matcher tables used by label derivation.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub risk: Vec<PatternRule<RiskFlag>>,
    /// Checked in order; the first category with a match wins.
    pub task_types: Vec<PatternRule<TaskType>>,
    pub greenfield: Vec<Regex>,
    pub modification: Vec<Regex>,
}

/// Vote counts behind the greenfield decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreenfieldCounts {
    pub new_work: usize,
    pub existing_work: usize,
}

impl GreenfieldCounts {
    /// Ties favor "not greenfield".
    pub fn is_greenfield(&self) -> bool {
        self.new_work > self.existing_work
    }
}

/// Risk flags whose match count meets the category threshold.
pub fn detect_risk_flags(text: &str, rules: &RuleSet) -> BTreeSet<RiskFlag> {
    rules
        .risk
        .iter()
        .filter(|rule| rule.fires(text))
        .map(|rule| rule.label)
        .collect()
}

/// First task type (in table order) with at least one matching pattern.
pub fn classify_task_type(text: &str, rules: &RuleSet) -> TaskType {
    rules
        .task_types
        .iter()
        .find(|rule| rule.fires(text))
        .map(|rule| rule.label)
        .unwrap_or(TaskType::Unknown)
}

pub fn greenfield_counts(text: &str, rules: &RuleSet) -> GreenfieldCounts {
    let count = |patterns: &[Regex]| patterns.iter().filter(|p| p.is_match(text)).count();
    GreenfieldCounts {
        new_work: count(&rules.greenfield),
        existing_work: count(&rules.modification),
    }
}

pub fn is_greenfield(text: &str, rules: &RuleSet) -> bool {
    greenfield_counts(text, rules).is_greenfield()
}
