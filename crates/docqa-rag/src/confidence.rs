use docqa_core::types::QueryResultEntry;

/// Top-1 similarity of the retrieved set, clamped to `[0, 1]`; 0 when nothing was retrieved.
pub fn confidence(entries: &[QueryResultEntry]) -> f32 {
    entries
        .iter()
        .map(|e| e.similarity_score)
        .find(|s| !s.is_nan())
        .map_or(0.0, |s| s.clamp(0.0, 1.0))
}

/// Number of distinct sources among `entries`.
pub fn distinct_sources(entries: &[QueryResultEntry]) -> usize {
    let mut seen: Vec<&str> = Vec::new();
    for e in entries {
        if !seen.contains(&e.source_name.as_str()) {
            seen.push(&e.source_name);
        }
    }
    seen.len()
}
