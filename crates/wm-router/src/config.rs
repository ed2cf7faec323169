//! Default pattern tables for risk flags, task types and greenfield detection.

use crate::rules::{PatternRule, RuleSet};
use regex::Regex;
use wm_core::{RiskFlag, TaskType};

/// (flag, threshold, patterns). Thresholds keep flags discriminative: a flag that fires on
/// most prompts carries no routing signal.
const RISK_TABLE: &[(RiskFlag, usize, &[&str])] = &[
    (
        RiskFlag::ModifiesExistingRuntime,
        3,
        &[
            r"(?i)\b(fix|update|modify|change|patch|refactor)\b",
            r"(?i)\b(existing|current|legacy)\b",
            r"(?i)\bquery\b.*\b(prisma|sql)\b",
        ],
    ),
    (
        RiskFlag::SchemaMigration,
        2,
        &[
            r"(?i)\bprisma\b",
            r"(?i)\bmigration\b",
            r"(?i)\bbackward.?compat",
            r"(?i)\bschema\b.*\b(change|update|add)\b",
            r"(?i)\b(prisma|database|db)\s+schema\b",
        ],
    ),
    (
        RiskFlag::LargeScopeRefactor,
        2,
        &[r"(?i)\bmodulariz", r"(?i)\brestructur", r"(?i)\brefactor\b"],
    ),
    (
        RiskFlag::CrossService,
        2,
        &[
            r"(?i)\bcross[- ]?repo\b",
            r"(?i)\bmulti[- ]?service\b",
            r"(?i)\bauth[- ]?service\b.*\bsite\b",
        ],
    ),
    (
        RiskFlag::RscSerialization,
        1,
        // RSC is matched case-sensitively: lowercase "rsc" is too common in paths.
        &[r"(?i)\bserver.?component", r"\bRSC\b", r"(?i)\bserialization\b"],
    ),
    (
        RiskFlag::TestInfrastructure,
        2,
        &[r"(?i)\bfix.*test", r"(?i)\bpytest\b", r"(?i)\bCI\b.*\b(fix|broken|fail)"],
    ),
];

/// Priority order matters: bugfix wording wins over feature wording in the same prompt.
const TASK_TYPE_TABLE: &[(TaskType, &[&str])] = &[
    (TaskType::Bugfix, &[r"(?i)\bfix\b", r"(?i)\bbug\b", r"(?i)\bbroken\b", r"(?i)\berror\b"]),
    (TaskType::Refactor, &[r"(?i)\brefactor\b", r"(?i)\brestructur", r"(?i)\bclean\s*up\b"]),
    (TaskType::Test, &[r"(?i)\btests?\b", r"(?i)\bspec\b", r"(?i)\bcoverage\b"]),
    (TaskType::Documentation, &[r"(?i)\bdocument", r"(?i)\breadme\b"]),
    (TaskType::Infrastructure, &[r"(?i)\bdeploy", r"(?i)\bdocker", r"(?i)\bmigration\b"]),
    (
        TaskType::Feature,
        &[r"(?i)\badd\b", r"(?i)\bimplement", r"(?i)\bcreate\b", r"(?i)\bnew\b"],
    ),
];

const GREENFIELD_PATTERNS: &[&str] = &[
    r"(?i)\bnew\s+(page|component|endpoint|service)\b",
    r"(?i)\bcreate\s+(a|the|new)\b",
    r"(?i)\badd\s+(a|the|new)\b",
    r"(?i)\bbuild\s+(a|the|new)\b",
];

const MODIFICATION_PATTERNS: &[&str] = &[
    r"(?i)\bfix\b",
    r"(?i)\bupdate\b",
    r"(?i)\bmodify\b",
    r"(?i)\brefactor\b",
    r"(?i)\bchange\b",
    r"(?i)\bremove\b",
    r"(?i)\bexisting\b",
];

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p)).collect()
}

/// Build the rule set from the default tables.
pub fn try_default_rules() -> Result<RuleSet, regex::Error> {
    let risk = RISK_TABLE
        .iter()
        .map(|(flag, threshold, patterns)| PatternRule::compile(*flag, patterns, *threshold))
        .collect::<Result<Vec<_>, _>>()?;
    let task_types = TASK_TYPE_TABLE
        .iter()
        .map(|(task_type, patterns)| PatternRule::compile(*task_type, patterns, 1))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuleSet {
        risk,
        task_types,
        greenfield: compile_all(GREENFIELD_PATTERNS)?,
        modification: compile_all(MODIFICATION_PATTERNS)?,
    })
}

pub fn default_rules() -> RuleSet {
    try_default_rules().expect("built-in routing patterns must compile")
}

/// The default rule set instance.
pub static RULES: std::sync::LazyLock<RuleSet> = std::sync::LazyLock::new(default_rules);
