use chrono::{DateTime, Utc};
use serde::Serialize;

use docqa_core::chunker::Chunker;
use docqa_core::config::Settings;
use docqa_core::error::{Error, Result};
use docqa_core::types::{Chunk, ChunkId, Rejection, SourceDocument};
use docqa_embed::TfidfVectorizer;
use docqa_text::TextCleaner;
use docqa_vector::IndexSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedDocument {
    pub source_name: String,
    pub chunk_count: usize,
    /// BLAKE3 hex digest of the raw upload.
    pub content_hash: String,
}

/// Per-file outcome of a `process` call.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub accepted: Vec<AcceptedDocument>,
    pub rejected: Vec<Rejection>,
    pub total_chunks: usize,
    pub dimension: usize,
    pub vocabulary_size: usize,
    pub processed_at: DateTime<Utc>,
}

/// Extraction, chunking and model fitting for a whole document set.
///
/// Everything here is CPU-bound and synchronous; the orchestrator runs it on
/// the blocking pool.
#[derive(Debug, Clone)]
pub struct Ingestor {
    chunker: Chunker,
    cleaner: TextCleaner,
    vectorizer: TfidfVectorizer,
    max_file_bytes: usize,
}

impl Ingestor {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            chunker: Chunker::new(settings.chunking.clone())?,
            cleaner: TextCleaner::new().map_err(|e| Error::processing(format!("text cleaner pattern: {e}")))?,
            vectorizer: TfidfVectorizer::new(settings.embedding.clone())?,
            max_file_bytes: settings.ingest.max_file_bytes,
        })
    }

    /// Build a fresh snapshot from `documents`. Chunk ids start at 0 and run
    /// contiguously across documents in input order.
    ///
    /// Files that fail are listed in the report; if none succeed the call
    /// fails with [`Error::Processing`].
    pub fn build(&self, documents: &[SourceDocument]) -> Result<(IndexSnapshot, IngestReport)> {
        let mut next_id: ChunkId = 0;
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for doc in documents {
            match self.chunk_document(doc, &mut next_id) {
                Ok(doc_chunks) => {
                    tracing::debug!(source = %doc.source_name, chunks = doc_chunks.len(), "document chunked");
                    accepted.push(AcceptedDocument {
                        source_name: doc.source_name.clone(),
                        chunk_count: doc_chunks.len(),
                        content_hash: blake3::hash(&doc.bytes).to_hex().to_string(),
                    });
                    chunks.extend(doc_chunks);
                }
                Err(e) => {
                    tracing::warn!(source = %doc.source_name, kind = e.kind(), error = %e, "document rejected");
                    rejected.push(Rejection {
                        source_name: doc.source_name.clone(),
                        kind: e.kind().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if accepted.is_empty() {
            return Err(Error::all_rejected(documents.len(), rejected));
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let model = self.vectorizer.fit(&texts)?;
        tracing::debug!(
            documents = accepted.len(),
            rejected = rejected.len(),
            chunks = model.document_count(),
            vocabulary = model.vocabulary_size(),
            "fitted term weights"
        );
        let dimension = model.dimension();
        let vocabulary_size = model.vocabulary_size();
        let snapshot = IndexSnapshot::assemble(chunks, model)?;

        let report = IngestReport {
            accepted,
            rejected,
            total_chunks: snapshot.chunks().len(),
            dimension,
            vocabulary_size,
            processed_at: snapshot.built_at(),
        };
        Ok((snapshot, report))
    }

    /// On failure the shared id counter is left untouched.
    fn chunk_document(&self, doc: &SourceDocument, next_id: &mut ChunkId) -> Result<Vec<Chunk>> {
        if doc.bytes.len() > self.max_file_bytes {
            return Err(Error::Extraction(format!(
                "file is {} bytes, larger than the {} byte limit",
                doc.bytes.len(),
                self.max_file_bytes
            )));
        }
        let text = docqa_extract::extract_document(doc)?;
        let cleaned = self.cleaner.clean(&text);
        let mut local = *next_id;
        let chunks = self.chunker.chunk(&cleaned, &doc.source_name, &mut local);
        if chunks.is_empty() {
            return Err(Error::Extraction("no extractable text".into()));
        }
        *next_id = local;
        Ok(chunks)
    }
}
