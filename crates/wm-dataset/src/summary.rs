//! Label distribution report.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use wm_core::LabeledExample;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelDistribution {
    pub total: usize,
    /// Each list is sorted by descending count, ties by name.
    pub models: Vec<(String, usize)>,
    pub cost_bands: Vec<(String, usize)>,
    pub risk_flags: Vec<(String, usize)>,
    pub task_types: Vec<(String, usize)>,
}

fn ranked(counts: BTreeMap<String, usize>) -> Vec<(String, usize)> {
    let mut v: Vec<_> = counts.into_iter().collect();
    v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    v
}

impl LabelDistribution {
    pub fn from_examples(examples: &[LabeledExample]) -> Self {
        let mut models = BTreeMap::new();
        let mut cost_bands = BTreeMap::new();
        let mut risk_flags = BTreeMap::new();
        let mut task_types = BTreeMap::new();

        for ex in examples {
            *models.entry(ex.label.recommended_model.clone()).or_insert(0) += 1;
            *cost_bands.entry(ex.label.cost_estimate.to_string()).or_insert(0) += 1;
            *task_types.entry(ex.inputs.task_type_hint.to_string()).or_insert(0) += 1;
            for flag in &ex.label.risk_flags {
                *risk_flags.entry(flag.to_string()).or_insert(0) += 1;
            }
        }

        Self {
            total: examples.len(),
            models: ranked(models),
            cost_bands: ranked(cost_bands),
            risk_flags: ranked(risk_flags),
            task_types: ranked(task_types),
        }
    }

    /// Share of examples labeled with `model`, in [0, 1].
    pub fn model_share(&self, model: &str) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let count = self.models.iter().find(|(m, _)| m == model).map(|(_, c)| *c).unwrap_or(0);
        count as f64 / self.total as f64
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, rows: &[(String, usize)]) -> fmt::Result {
    writeln!(f, "{title}:")?;
    for (name, count) in rows {
        writeln!(f, "  {name}: {count}")?;
    }
    Ok(())
}

impl fmt::Display for LabelDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_section(f, "Model distribution", &self.models)?;
        writeln!(f)?;
        write_section(f, "Cost distribution", &self.cost_bands)?;
        writeln!(f)?;
        write_section(f, "Risk flag frequency", &self.risk_flags)?;
        writeln!(f)?;
        write_section(f, "Task types", &self.task_types)
    }
}
