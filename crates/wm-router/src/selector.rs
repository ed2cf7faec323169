//! Agent resolution from model id.

use std::collections::BTreeMap;
use wm_core::Agent;

/// Map a model id to the agent CLI that runs it.
///
/// The explicit table wins; otherwise `claude-*` goes to claude, `gpt-*` and o-series ids
/// (`o1`, `o3-mini`, ...) go to codex, and anything unrecognized stays on claude.
pub fn resolve_agent(model_id: &str, agents: &BTreeMap<String, Agent>) -> Agent {
    if let Some(agent) = agents.get(model_id) {
        return *agent;
    }
    if model_id.starts_with("claude-") {
        return Agent::Claude;
    }
    if model_id.starts_with("gpt-") || is_o_series(model_id) {
        return Agent::Codex;
    }
    Agent::Claude
}

fn is_o_series(model_id: &str) -> bool {
    let mut chars = model_id.chars();
    chars.next() == Some('o') && chars.next().is_some_and(|c| c.is_ascii_digit())
}
