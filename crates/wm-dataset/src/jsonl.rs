//! JSONL record parsing for aggregated eval files.

use serde_json::Value;
use wm_core::HistoricalRecord;

/// Why a line produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRejection {
    Blank,
    Malformed,
    MissingPrompt,
}

/// Parse one line into a record, or say why it was rejected.
pub fn parse_line(line: &str) -> Result<HistoricalRecord, LineRejection> {
    let line = line.trim();
    if line.is_empty() {
        return Err(LineRejection::Blank);
    }

    let value = match serde_json::from_str::<Value>(line) {
        Ok(value @ Value::Object(_)) => value,
        _ => return Err(LineRejection::Malformed),
    };

    // A null, empty or non-string prompt leaves nothing to route.
    match value.get("originalPrompt") {
        Some(Value::String(prompt)) if !prompt.is_empty() => {}
        _ => return Err(LineRejection::MissingPrompt),
    }

    serde_json::from_value::<HistoricalRecord>(value).map_err(|_| LineRejection::Malformed)
}

/// Parse one line, dropping anything unusable.
pub fn parse_record(line: &str) -> Option<HistoricalRecord> {
    parse_line(line).ok()
}

/// Parse every usable record in a JSONL document, in order.
pub fn parse_records(content: &str) -> Vec<HistoricalRecord> {
    content.lines().filter_map(parse_record).collect()
}
