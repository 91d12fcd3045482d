use crate::error::Result;
use crate::types::{Chunk, IndexStats, SearchHit};

/// A fitted text-to-vector transform.
///
/// Implementations must be deterministic: the same text always yields a
/// bit-identical vector of length `dim()`.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;

    fn embed_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Nearest-neighbour index over chunk vectors.
pub trait VectorIndexer: Send + Sync {
    /// Replace the whole index. On error the previous contents stay active.
    fn build(&mut self, chunks: &[Chunk], embeddings: Vec<Vec<f32>>) -> Result<()>;
    /// Top-`k` hits, highest score first, ties by ascending chunk id.
    fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>>;
    fn clear(&mut self);
    fn stats(&self) -> IndexStats;
}
