//! Resilient parsing of the model's free-text reply.
//!
//! The model is told to return bare JSON, but real replies sometimes arrive
//! wrapped in prose or code fences. We slice from the first `{` to the last
//! `}` and parse that window; the orchestrator falls back to a degraded
//! record when even the window is not valid JSON. The heuristic lives behind
//! this one function so a structured-output decoding mode can replace it
//! without touching callers.

use super::record::Extraction;

pub fn parse_extraction(raw: &str) -> Option<Extraction> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}
