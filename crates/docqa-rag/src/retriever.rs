use docqa_core::config::RetrievalSettings;
use docqa_core::error::{Error, Result};
use docqa_core::traits::{Embedder, VectorIndexer};
use docqa_core::types::QueryResultEntry;
use docqa_vector::IndexSnapshot;

/// Text in, ranked passages out.
#[derive(Debug, Clone)]
pub struct Retriever {
    settings: RetrievalSettings,
}

impl Retriever {
    pub fn new(settings: RetrievalSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// `None` selects the configured default; larger values are capped at `max_top_k`.
    pub fn resolve_k(&self, k: Option<usize>) -> usize {
        k.unwrap_or(self.settings.default_top_k).min(self.settings.max_top_k)
    }

    pub fn retrieve(&self, snapshot: &IndexSnapshot, query: &str, k: usize) -> Result<Vec<QueryResultEntry>> {
        if query.trim().is_empty() {
            return Err(Error::InvalidQuery("query must not be empty".into()));
        }
        let query_vec = snapshot.model().embed(query);
        let hits = snapshot.index().search_vec(&query_vec, k)?;

        let mut entries = Vec::with_capacity(hits.len());
        for hit in hits {
            let chunk = snapshot
                .chunk(hit.chunk_id)
                .ok_or_else(|| Error::Snapshot(format!("index references unknown chunk {}", hit.chunk_id)))?;
            entries.push(QueryResultEntry {
                chunk_id: hit.chunk_id,
                source_name: chunk.source_name.clone(),
                similarity_score: hit.score,
                preview: preview(&chunk.text, self.settings.preview_chars),
            });
        }
        Ok(entries)
    }
}

/// First `max_chars` characters, with `...` appended when anything was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => format!("{}...", &text[..byte]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("exactly10!", 10), "exactly10!");
        assert_eq!(preview("ééééé", 3), "ééé...");
    }

    #[test]
    fn k_defaults_and_caps() {
        let r = Retriever::new(RetrievalSettings::default()).expect("settings");
        assert_eq!(r.resolve_k(None), 5);
        assert_eq!(r.resolve_k(Some(3)), 3);
        assert_eq!(r.resolve_k(Some(500)), 20);
    }
}
