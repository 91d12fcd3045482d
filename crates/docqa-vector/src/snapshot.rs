use chrono::{DateTime, Utc};

use docqa_core::error::{Error, Result};
use docqa_core::traits::{Embedder, VectorIndexer};
use docqa_core::types::{Chunk, ChunkId, IndexStats, SearchHit};
use docqa_embed::TfidfModel;

use crate::flat::FlatIndex;

/// Everything a query needs, built together and replaced together.
///
/// Every chunk has exactly one vector, and every vector was produced by
/// `model`. Chunks are kept sorted by id.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    chunks: Vec<Chunk>,
    model: TfidfModel,
    index: FlatIndex,
    documents: Vec<String>,
    built_at: DateTime<Utc>,
}

impl IndexSnapshot {
    /// Embed every chunk with `model` and build the index.
    pub fn assemble(chunks: Vec<Chunk>, model: TfidfModel) -> Result<Self> {
        Self::assemble_at(chunks, model, Utc::now())
    }

    pub(crate) fn assemble_at(mut chunks: Vec<Chunk>, model: TfidfModel, built_at: DateTime<Utc>) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::processing("Cannot build an index without chunks"));
        }
        let mut documents: Vec<String> = Vec::new();
        for c in &chunks {
            if !documents.contains(&c.source_name) {
                documents.push(c.source_name.clone());
            }
        }
        chunks.sort_by_key(|c| c.chunk_id);

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = model.embed_batch(&texts);
        let mut index = FlatIndex::new(model.dim());
        index.build(&chunks, embeddings)?;

        tracing::debug!(
            chunks = chunks.len(),
            documents = documents.len(),
            model = %model.model_id(),
            "assembled index snapshot"
        );
        Ok(Self { chunks, model, index, documents, built_at })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.binary_search_by_key(&id, |c| c.chunk_id).ok().map(|i| &self.chunks[i])
    }

    pub fn model(&self) -> &TfidfModel {
        &self.model
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// Source names in ingest order.
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Vectorize `query` with the snapshot's own model and search.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.index.search_vec(&self.model.embed(query), k)
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = self.index.stats();
        let text: usize = self.chunks.iter().map(|c| c.text.len() + c.source_name.len()).sum();
        stats.approximate_memory_bytes += text + self.model.approximate_memory_bytes();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::config::EmbeddingSettings;
    use docqa_embed::TfidfVectorizer;

    fn chunk(id: ChunkId, source: &str, text: &str) -> Chunk {
        Chunk {
            chunk_id: id,
            source_name: source.into(),
            text: text.into(),
            offset: 0,
            chunk_index: 0,
            total_chunks: 1,
        }
    }

    fn snapshot() -> IndexSnapshot {
        let chunks = vec![
            chunk(1, "b.txt", "Rainwater barrels store water for the garden."),
            chunk(0, "a.txt", "Solar panels convert sunlight into electricity."),
        ];
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let model = TfidfVectorizer::new(EmbeddingSettings::default())
            .and_then(|v| v.fit(&texts))
            .expect("fit");
        IndexSnapshot::assemble(chunks, model).expect("assemble")
    }

    #[test]
    fn chunks_sorted_and_addressable() {
        let s = snapshot();
        assert_eq!(s.chunks().iter().map(|c| c.chunk_id).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(s.chunk(1).map(|c| c.source_name.as_str()), Some("b.txt"));
        assert!(s.chunk(7).is_none());
        assert_eq!(s.documents(), ["b.txt".to_string(), "a.txt".to_string()]);
    }

    #[test]
    fn search_uses_snapshot_model() {
        let s = snapshot();
        let hits = s.search("solar electricity", 2).expect("search");
        assert_eq!(hits[0].chunk_id, 0);
        assert!(hits[0].score > hits[1].score);
        assert_eq!(s.stats().chunk_count, 2);
        assert_eq!(s.stats().dimension, 384);
        assert!(s.stats().approximate_memory_bytes > 2 * 384 * 4);
    }

    #[test]
    fn empty_chunk_list_is_rejected() {
        let model = TfidfVectorizer::new(EmbeddingSettings::default())
            .and_then(|v| v.fit(&["x y"]))
            .expect("fit");
        assert_eq!(IndexSnapshot::assemble(Vec::new(), model).err().map(|e| e.kind()), Some("processing"));
    }
}
