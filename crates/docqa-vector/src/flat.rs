use std::collections::HashSet;

use docqa_core::error::{Error, Result};
use docqa_core::traits::VectorIndexer;
use docqa_core::types::{Chunk, ChunkId, IndexStats, SearchHit};

/// Exhaustive cosine-similarity index over fixed-dimension vectors.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    ids: Vec<ChunkId>,
    /// Row-major, `ids.len() * dimension` values.
    vectors: Vec<f32>,
    norms: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self { dimension, ids: Vec::new(), vectors: Vec::new(), norms: Vec::new() }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn row(&self, i: usize) -> &[f32] {
        &self.vectors[i * self.dimension..(i + 1) * self.dimension]
    }

    fn score(&self, i: usize, query: &[f32], query_norm: f32) -> f32 {
        let norm = self.norms[i];
        if norm <= f32::EPSILON || query_norm <= f32::EPSILON {
            return 0.0;
        }
        let dot: f32 = self.row(i).iter().zip(query).map(|(a, b)| a * b).sum();
        let s = dot / (norm * query_norm);
        // `<= 0.0` also folds -0.0 into 0.0 so equal scores order by id.
        if s.is_nan() || s <= 0.0 { 0.0 } else { s.min(1.0) }
    }
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

impl VectorIndexer for FlatIndex {
    fn build(&mut self, chunks: &[Chunk], embeddings: Vec<Vec<f32>>) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(Error::processing(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        let mut seen = HashSet::with_capacity(chunks.len());
        if let Some(dup) = chunks.iter().find(|c| !seen.insert(c.chunk_id)) {
            return Err(Error::processing(format!("duplicate chunk id {}", dup.chunk_id)));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimension) {
            return Err(Error::DimensionMismatch { expected: self.dimension, actual: bad.len() });
        }

        let mut vectors = Vec::with_capacity(chunks.len() * self.dimension);
        let mut norms = Vec::with_capacity(chunks.len());
        for e in &embeddings {
            norms.push(norm(e));
            vectors.extend_from_slice(e);
        }
        self.ids = chunks.iter().map(|c| c.chunk_id).collect();
        self.vectors = vectors;
        self.norms = norms;
        Ok(())
    }

    fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query_vec.len() != self.dimension {
            return Err(Error::DimensionMismatch { expected: self.dimension, actual: query_vec.len() });
        }
        if self.is_empty() {
            return Err(Error::EmptyIndex);
        }
        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let qn = norm(query_vec);
        let mut hits: Vec<SearchHit> = (0..self.len())
            .map(|i| SearchHit { chunk_id: self.ids[i], score: self.score(i, query_vec, qn) })
            .collect();
        let order = |a: &SearchHit, b: &SearchHit| b.score.total_cmp(&a.score).then(a.chunk_id.cmp(&b.chunk_id));
        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, order);
            hits.truncate(k);
        }
        hits.sort_by(order);
        Ok(hits)
    }

    fn clear(&mut self) {
        self.ids.clear();
        self.vectors.clear();
        self.norms.clear();
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            chunk_count: self.len(),
            dimension: self.dimension,
            approximate_memory_bytes: self.vectors.len() * std::mem::size_of::<f32>()
                + self.norms.len() * std::mem::size_of::<f32>()
                + self.ids.len() * std::mem::size_of::<ChunkId>(),
        }
    }
}
